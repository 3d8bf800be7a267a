/// String utility functions
pub struct StringUtils;

impl StringUtils {
    /// Replace path separators so the value stays a single path segment
    pub fn safe_segment(s: &str) -> String {
        s.replace(['/', '\\'], "-")
    }

    /// File stem for a cover image: lowercase, spaces to hyphens, and path
    /// separators to hyphens so a title can never leave its category folder
    pub fn image_file_stem(title: &str) -> String {
        Self::safe_segment(&title.to_lowercase().replace(' ', "-"))
    }

    /// Lowercase alphanumeric extension of the last path segment, if any
    pub fn url_extension(url: &url::Url) -> Option<String> {
        let segment = url.path_segments()?.last()?;
        let (_, ext) = segment.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
