//! Open/save dialogs and the image filters they share.

use std::path::{Path, PathBuf};

use rfd::FileDialog;

/// Extensions accepted for background images
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A named dialog filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

/// Filters offered by both dialogs, in filter-index order
pub const IMAGE_FILTERS: [Filter; 3] = [
    Filter { name: "All supported graphics", extensions: &["jpg", "jpeg", "png"] },
    Filter { name: "JPEG (*.jpg;*.jpeg)", extensions: &["jpg", "jpeg"] },
    Filter { name: "Portable Network Graphic (*.png)", extensions: &["png"] },
];

/// Filter index selected by default when saving (PNG)
pub const SAVE_FILTER_INDEX: usize = 2;

pub const DEFAULT_EXPORT_NAME: &str = "spraypaint.png";

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// True if `path` passes the open filter
pub fn is_supported_image(path: &Path) -> bool {
    match extension_of(path) {
        Some(ext) => IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

/// Filters for the open dialog, "all supported" first
pub fn open_filters() -> Vec<Filter> {
    IMAGE_FILTERS.to_vec()
}

/// Filters for the save dialog. Native dialogs preselect the first entry,
/// so the default one is moved to the front.
pub fn save_filters() -> Vec<Filter> {
    let mut filters = vec![IMAGE_FILTERS[SAVE_FILTER_INDEX]];
    filters.extend(
        IMAGE_FILTERS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != SAVE_FILTER_INDEX)
            .map(|(_, f)| *f),
    );
    filters
}

/// Turn a requested destination into the final PNG path.
/// An empty request falls back to the default name; a missing
/// extension gets the save filter's extension.
pub fn resolve_export_path(requested: Option<&Path>) -> PathBuf {
    let path = match requested {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(DEFAULT_EXPORT_NAME),
    };
    if path.extension().is_none() {
        path.with_extension(IMAGE_FILTERS[SAVE_FILTER_INDEX].extensions[0])
    } else {
        path
    }
}

/// Human-readable summary of the open filter, for log lines
pub fn filter_description() -> String {
    let filter = IMAGE_FILTERS[0];
    let patterns: Vec<String> = filter.extensions.iter().map(|e| format!("*.{}", e)).collect();
    format!("{} ({})", filter.name, patterns.join(";"))
}

fn with_filters(mut dialog: FileDialog, filters: &[Filter]) -> FileDialog {
    for filter in filters {
        dialog = dialog.add_filter(filter.name, filter.extensions);
    }
    dialog
}

fn start_directory(near: Option<&Path>) -> Option<PathBuf> {
    near.and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Ask for a background image. `None` when the user cancels.
pub fn pick_image(near: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = with_filters(FileDialog::new().set_title("Select a picture"), &open_filters());
    if let Some(dir) = start_directory(near) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

/// Ask where to save the PNG. `None` when the user cancels.
pub fn pick_export(suggested: &Path) -> Option<PathBuf> {
    let mut dialog = with_filters(FileDialog::new().set_title("Save image"), &save_filters());
    if let Some(dir) = start_directory(Some(suggested)) {
        dialog = dialog.set_directory(dir);
    }
    if let Some(name) = suggested.file_name().and_then(|n| n.to_str()) {
        dialog = dialog.set_file_name(name);
    }
    dialog.save_file().map(|path| resolve_export_path(Some(&path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_filter_accepts_png_and_jpeg_only() {
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.JPG")));
        assert!(is_supported_image(Path::new("dir/photo.jpeg")));
        assert!(!is_supported_image(Path::new("photo.bmp")));
        assert!(!is_supported_image(Path::new("photo.gif")));
        assert!(!is_supported_image(Path::new("photo")));
    }

    #[test]
    fn export_path_defaults_to_png() {
        assert_eq!(resolve_export_path(None), PathBuf::from("spraypaint.png"));
        assert_eq!(resolve_export_path(Some(Path::new(""))), PathBuf::from("spraypaint.png"));
        assert_eq!(resolve_export_path(Some(Path::new("out/result"))), PathBuf::from("out/result.png"));
        assert_eq!(resolve_export_path(Some(Path::new("result.png"))), PathBuf::from("result.png"));
    }

    #[test]
    fn open_dialog_offers_every_filter_all_supported_first() {
        let filters = open_filters();
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0].extensions, &["jpg", "jpeg", "png"]);
        for ext in IMAGE_EXTENSIONS {
            assert!(filters[0].extensions.contains(&ext));
        }
    }

    #[test]
    fn save_dialog_preselects_png() {
        let filters = save_filters();
        assert_eq!(filters.len(), IMAGE_FILTERS.len());
        assert_eq!(filters[0], IMAGE_FILTERS[SAVE_FILTER_INDEX]);
        assert_eq!(filters[0].extensions, &["png"]);
        // the other filters are still there, in their original order
        assert_eq!(filters[1], IMAGE_FILTERS[0]);
        assert_eq!(filters[2], IMAGE_FILTERS[1]);
    }

    #[test]
    fn dialogs_start_next_to_the_previous_file() {
        assert_eq!(start_directory(Some(Path::new("shots/photo.png"))), Some(PathBuf::from("shots")));
        assert_eq!(start_directory(Some(Path::new("photo.png"))), None);
        assert_eq!(start_directory(None), None);
    }

    #[test]
    fn filter_description_lists_patterns() {
        assert_eq!(filter_description(), "All supported graphics (*.jpg;*.jpeg;*.png)");
    }
}
