//! Navigation link state

/// Classes applied to the active navigation link
pub const ACTIVE_LINK_CLASSES: &str = "bg-primary text-primary-content";

/// Whether `link_path` is the active link for `current_path`.
///
/// The root link is active only on `/`; other links are active on their own
/// path and everything below it.
pub fn is_nav_link_active(current_path: &str, link_path: &str) -> bool {
    if link_path == "/" {
        return current_path == "/";
    }
    current_path.starts_with(link_path)
}

/// Classes for a navigation link, empty when inactive
pub fn nav_link_classes(current_path: &str, link_path: &str) -> &'static str {
    if is_nav_link_active(current_path, link_path) {
        ACTIVE_LINK_CLASSES
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_matches_exactly() {
        assert!(is_nav_link_active("/", "/"));
        assert!(!is_nav_link_active("/work-orders", "/"));
    }

    #[test]
    fn test_prefix_match() {
        assert!(is_nav_link_active("/work-orders", "/work-orders"));
        assert!(is_nav_link_active("/work-orders/42", "/work-orders"));
        assert!(!is_nav_link_active("/map", "/work-orders"));
    }

    #[test]
    fn test_classes() {
        assert_eq!(nav_link_classes("/map", "/map"), ACTIVE_LINK_CLASSES);
        assert_eq!(nav_link_classes("/", "/map"), "");
    }
}
