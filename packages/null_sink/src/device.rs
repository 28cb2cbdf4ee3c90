use std::path::Path;

/// Returns the path of the operating system's discard device.
///
/// This is `NUL` on Windows and `/dev/null` everywhere else. Opening a file at this
/// path yields a writer whose writes complete without retaining or transmitting
/// anything, which makes it a usable alternative terminal target for pipelines
/// that insist on writing to a real file handle. The in-memory [`NullSink`] remains
/// the preferred medium because it also counts what it discards.
///
/// # Examples
///
/// ```
/// let path = null_sink::null_device_path();
///
/// if cfg!(windows) {
///     assert_eq!(path.to_str(), Some("NUL"));
/// } else {
///     assert_eq!(path.to_str(), Some("/dev/null"));
/// }
/// ```
///
/// [`NullSink`]: crate::NullSink
#[must_use]
pub fn null_device_path() -> &'static Path {
    if cfg!(windows) {
        Path::new("NUL")
    } else {
        Path::new("/dev/null")
    }
}
