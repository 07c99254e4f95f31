use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (logs, local post files)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Path prefix inserted between base URL and endpoint (e.g. "/api")
    #[serde(default)]
    pub prefix: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            prefix: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Sizing of the post cache queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts shown right after the initial load
    #[serde(default = "default_initial_display_count")]
    pub initial_display_count: usize,
    /// Target number of queued (not yet displayed) posts
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Queue length below which a refill is requested
    #[serde(default = "default_refill_threshold")]
    pub refill_threshold: usize,
    /// Posts requested per refill
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_display_count: default_initial_display_count(),
            cache_size: default_cache_size(),
            refill_threshold: default_refill_threshold(),
            fetch_batch_size: default_fetch_batch_size(),
        }
    }
}

/// Height estimation constants, in abstract layout units (roughly pixels)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Height budget of a single page
    #[serde(default = "default_page_height_limit")]
    pub page_height_limit: u32,
    /// Average characters per rendered line (wide characters)
    #[serde(default = "default_chars_per_line")]
    pub chars_per_line: u32,
    #[serde(default = "default_line_height")]
    pub line_height: u32,
    /// Vertical margin added to every text block
    #[serde(default = "default_text_margin")]
    pub text_margin: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default = "default_heading_height")]
    pub heading_height: u32,
    #[serde(default = "default_spacer_height")]
    pub spacer_height: u32,
    /// Space kept clear of the page footer when a page is entered from below
    #[serde(default = "default_footer_clearance")]
    pub footer_clearance: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_height_limit: default_page_height_limit(),
            chars_per_line: default_chars_per_line(),
            line_height: default_line_height(),
            text_margin: default_text_margin(),
            image_height: default_image_height(),
            heading_height: default_heading_height(),
            spacer_height: default_spacer_height(),
            footer_clearance: default_footer_clearance(),
        }
    }
}

/// Gesture thresholds and cooldown windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum vertical wheel delta that counts as a page intent
    #[serde(default = "default_wheel_threshold")]
    pub wheel_threshold: f32,
    /// Boundary tolerance for wheel input
    #[serde(default = "default_wheel_epsilon")]
    pub wheel_epsilon: f32,
    /// Minimum vertical drag distance that counts as a page intent
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f32,
    /// Boundary tolerance for touch input (covers elastic overscroll)
    #[serde(default = "default_touch_epsilon")]
    pub touch_epsilon: f32,
    /// Page intent cooldown in milliseconds
    #[serde(default = "default_page_lock_ms")]
    pub page_lock_ms: u64,
    /// Minimum horizontal wheel delta that counts as a post intent
    #[serde(default = "default_post_wheel_threshold")]
    pub post_wheel_threshold: f32,
    /// Minimum horizontal swipe distance that counts as a post intent
    #[serde(default = "default_post_swipe_threshold")]
    pub post_swipe_threshold: f32,
    /// Required ratio |dx| / |dy| for a swipe to count as horizontal
    #[serde(default = "default_horizontal_dominance")]
    pub horizontal_dominance: f32,
    /// Post switch cooldown in milliseconds
    #[serde(default = "default_post_lock_ms")]
    pub post_lock_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            wheel_threshold: default_wheel_threshold(),
            wheel_epsilon: default_wheel_epsilon(),
            drag_threshold: default_drag_threshold(),
            touch_epsilon: default_touch_epsilon(),
            page_lock_ms: default_page_lock_ms(),
            post_wheel_threshold: default_post_wheel_threshold(),
            post_swipe_threshold: default_post_swipe_threshold(),
            horizontal_dominance: default_horizontal_dominance(),
            post_lock_ms: default_post_lock_ms(),
        }
    }
}

impl GestureConfig {
    pub fn page_lock(&self) -> Duration {
        Duration::from_millis(self.page_lock_ms)
    }

    pub fn post_lock(&self) -> Duration {
        Duration::from_millis(self.post_lock_ms)
    }
}

/// Easing curve used for slide transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump straight to the end state
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    /// Matches CSS `ease-in-out`
    EaseInOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Page slide duration; also the page navigator's transition window
    #[serde(default = "default_page_transition_ms")]
    pub page_transition_ms: u64,
    /// Post slide duration
    #[serde(default = "default_post_transition_ms")]
    pub post_transition_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Frame rate while a transition is running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            page_transition_ms: default_page_transition_ms(),
            post_transition_ms: default_post_transition_ms(),
            easing: EasingType::default(),
            animation_fps: default_animation_fps(),
        }
    }
}

impl AnimationConfig {
    pub fn page_transition(&self) -> Duration {
        Duration::from_millis(self.page_transition_ms)
    }

    pub fn post_transition(&self) -> Duration {
        Duration::from_millis(self.post_transition_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Show the "n / m" page indicator
    #[serde(default = "default_true")]
    pub show_page_indicator: bool,
    /// Scroll offset on the first page after which the header collapses
    #[serde(default = "default_header_compact_offset")]
    pub header_compact_offset: u32,
    /// Wheel delta reported for one mouse wheel notch
    #[serde(default = "default_wheel_step")]
    pub wheel_step: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            show_page_indicator: default_true(),
            header_compact_offset: default_header_compact_offset(),
            wheel_step: default_wheel_step(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-j>" (Ctrl+j), "<S-g>" (Shift+g), "<CR>" (Enter), "<Esc>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Move down in the feed / scroll down in the reader
    #[serde(default = "default_key_move_down")]
    pub move_down: String,
    /// Move up in the feed / scroll up in the reader
    #[serde(default = "default_key_move_up")]
    pub move_up: String,
    #[serde(default = "default_key_scroll_half_down")]
    pub scroll_half_down: String,
    #[serde(default = "default_key_scroll_half_up")]
    pub scroll_half_up: String,
    /// Open the selected post
    #[serde(default = "default_key_select")]
    pub select: String,
    /// Close the reader
    #[serde(default = "default_key_close")]
    pub close: String,
    /// Jump to the next page (footer button)
    #[serde(default = "default_key_next_page")]
    pub next_page: String,
    #[serde(default = "default_key_prev_page")]
    pub prev_page: String,
    /// Switch to the next post in the feed
    #[serde(default = "default_key_next_post")]
    pub next_post: String,
    #[serde(default = "default_key_prev_post")]
    pub prev_post: String,
    #[serde(default = "default_key_toggle_like")]
    pub toggle_like: String,
    #[serde(default = "default_key_toggle_saved")]
    pub toggle_saved: String,
    /// Reload the feed
    #[serde(default = "default_key_refresh")]
    pub refresh: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            move_down: default_key_move_down(),
            move_up: default_key_move_up(),
            scroll_half_down: default_key_scroll_half_down(),
            scroll_half_up: default_key_scroll_half_up(),
            select: default_key_select(),
            close: default_key_close(),
            next_page: default_key_next_page(),
            prev_page: default_key_prev_page(),
            next_post: default_key_next_post(),
            prev_post: default_key_prev_post(),
            toggle_like: default_key_toggle_like(),
            toggle_saved: default_key_toggle_saved(),
            refresh: default_key_refresh(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_move_down() -> String { "j".to_string() }
fn default_key_move_up() -> String { "k".to_string() }
fn default_key_scroll_half_down() -> String { "<C-d>".to_string() }
fn default_key_scroll_half_up() -> String { "<C-u>".to_string() }
fn default_key_select() -> String { "<CR>".to_string() }
fn default_key_close() -> String { "<BS>".to_string() }
fn default_key_next_page() -> String { "<Space>".to_string() }
fn default_key_prev_page() -> String { "b".to_string() }
fn default_key_next_post() -> String { "l".to_string() }
fn default_key_prev_post() -> String { "h".to_string() }
fn default_key_toggle_like() -> String { "f".to_string() }
fn default_key_toggle_saved() -> String { "s".to_string() }
fn default_key_refresh() -> String { "r".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spark")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://spark-api-346549054402.us-east1.run.app".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_initial_display_count() -> usize {
    6
}

fn default_cache_size() -> usize {
    5
}

fn default_refill_threshold() -> usize {
    2
}

fn default_fetch_batch_size() -> usize {
    5
}

fn default_page_height_limit() -> u32 {
    800
}

fn default_chars_per_line() -> u32 {
    22 // mobile average for CJK text
}

fn default_line_height() -> u32 {
    24
}

fn default_text_margin() -> u32 {
    16
}

fn default_image_height() -> u32 {
    300
}

fn default_heading_height() -> u32 {
    50
}

fn default_spacer_height() -> u32 {
    30
}

fn default_footer_clearance() -> u32 {
    160
}

fn default_wheel_threshold() -> f32 {
    20.0
}

fn default_wheel_epsilon() -> f32 {
    5.0
}

fn default_drag_threshold() -> f32 {
    40.0
}

fn default_touch_epsilon() -> f32 {
    10.0
}

fn default_page_lock_ms() -> u64 {
    600
}

fn default_post_wheel_threshold() -> f32 {
    30.0
}

fn default_post_swipe_threshold() -> f32 {
    40.0
}

fn default_horizontal_dominance() -> f32 {
    1.5
}

fn default_post_lock_ms() -> u64 {
    400
}

fn default_page_transition_ms() -> u64 {
    400
}

fn default_post_transition_ms() -> u64 {
    300
}

fn default_animation_fps() -> u32 {
    60
}

fn default_tick_rate() -> u64 {
    100
}

fn default_header_compact_offset() -> u32 {
    24
}

fn default_wheel_step() -> f32 {
    72.0 // three lines at the default line height
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults when absent
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/spark/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("spark")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file path used while the TUI owns the terminal
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("spark.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reader_constants() {
        let config = AppConfig::default();
        assert_eq!(config.layout.chars_per_line, 22);
        assert_eq!(config.layout.line_height, 24);
        assert_eq!(config.layout.footer_clearance, 160);
        assert_eq!(config.animation.page_transition_ms, 400);
        assert_eq!(config.gestures.page_lock_ms, 600);
        assert_eq!(config.gestures.post_lock_ms, 400);
        assert_eq!(config.feed.initial_display_count, 6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [layout]
            page_height_limit = 640

            [animation]
            easing = "ease_in_out"
            "#,
        )
        .unwrap();

        assert_eq!(config.layout.page_height_limit, 640);
        assert_eq!(config.layout.image_height, 300);
        assert_eq!(config.animation.easing, EasingType::EaseInOut);
        assert_eq!(config.gestures.wheel_threshold, 20.0);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[layout\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.layout, config.layout);
        assert_eq!(parsed.gestures, config.gestures);
    }
}
