use std::time::Duration;

pub(super) fn default_content_url() -> String {
    "https://api.chucknorris.io/jokes/random".to_string()
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

pub(super) fn default_subject() -> String {
    "Chuck Norris".to_string()
}

pub(super) fn default_replacement() -> String {
    "Gabe".to_string()
}

pub(super) const fn default_capacity() -> usize {
    5
}

pub(super) const fn default_lifetime_min() -> Duration {
    Duration::from_secs(30)
}

pub(super) const fn default_lifetime_max() -> Duration {
    Duration::from_secs(45)
}

pub(super) const fn default_fade() -> Duration {
    Duration::from_secs(2)
}

pub(super) const fn default_respawn_min() -> Duration {
    Duration::from_secs(2)
}

pub(super) const fn default_respawn_max() -> Duration {
    Duration::from_secs(5)
}

pub(super) const fn default_seed_window() -> Duration {
    Duration::from_secs(2)
}

pub(super) const fn default_event_queue_bound() -> usize {
    64
}

pub(super) const fn default_edge_margin() -> f64 {
    50.0
}

pub(super) const fn default_inner_margin() -> f64 {
    10.0
}

pub(super) const fn default_center_padding() -> f64 {
    150.0
}

pub(super) const fn default_max_attempts() -> u32 {
    10
}

pub(super) const fn default_viewport_width() -> f64 {
    1280.0
}

pub(super) const fn default_viewport_height() -> f64 {
    800.0
}

pub(super) const fn default_max_width() -> f64 {
    180.0
}

pub(super) const fn default_char_width() -> f64 {
    7.0
}

pub(super) const fn default_line_height() -> f64 {
    18.0
}

pub(super) const fn default_padding() -> f64 {
    12.0
}

pub(super) fn default_notify_appname() -> String {
    "Blurbs".to_string()
}
