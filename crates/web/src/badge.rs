//! Tailwind classes for status and priority badges
//!
//! Modal badges use saturated colors; table badges are low-contrast class
//! strings. Lookups are case-insensitive and unknown values get a neutral
//! style.

use serde::Serialize;

/// Class set for a modal badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeClasses {
    /// Background class
    pub bg: &'static str,
    /// Text color class
    pub text: &'static str,
    /// Border class, priority badges only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<&'static str>,
}

impl BadgeClasses {
    const fn plain(bg: &'static str, text: &'static str) -> Self {
        Self { bg, text, border: None }
    }

    const fn bordered(bg: &'static str, text: &'static str, border: &'static str) -> Self {
        Self {
            bg,
            text,
            border: Some(border),
        }
    }

    /// All classes joined by spaces
    pub fn class_string(&self) -> String {
        match self.border {
            Some(border) => format!("{} {} {}", self.bg, self.text, border),
            None => format!("{} {}", self.bg, self.text),
        }
    }
}

/// Modal badge for a work-order status
pub fn modal_status_badge(status: &str) -> BadgeClasses {
    match status.to_lowercase().as_str() {
        "open" => BadgeClasses::plain("bg-sky-600", "text-sky-50"),
        "in progress" | "pending" => BadgeClasses::plain("bg-amber-500", "text-amber-950"),
        "on hold" => BadgeClasses::plain("bg-indigo-600", "text-indigo-50"),
        "closed" | "completed" | "resolved" => BadgeClasses::plain("bg-emerald-600", "text-emerald-50"),
        "cancelled" | "failed" => BadgeClasses::plain("bg-rose-600", "text-rose-50"),
        _ => BadgeClasses::plain("bg-slate-500", "text-slate-50"),
    }
}

/// Modal badge for a priority, always bordered
pub fn modal_priority_badge(priority: &str) -> BadgeClasses {
    match priority.to_lowercase().as_str() {
        "low" => BadgeClasses::bordered("bg-green-100", "text-green-800", "border-green-500"),
        "medium" => BadgeClasses::bordered("bg-yellow-100", "text-yellow-800", "border-yellow-500"),
        "high" => BadgeClasses::bordered("bg-red-100", "text-red-800", "border-red-500"),
        "urgent" | "critical" => BadgeClasses::bordered("bg-purple-100", "text-purple-800", "border-purple-500"),
        _ => BadgeClasses::bordered("bg-gray-100", "text-gray-800", "border-gray-500"),
    }
}

/// Table cell classes for a status
pub fn table_status_badge(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "open" => "bg-blue-50 text-blue-700 border-blue-200",
        "in progress" => "bg-amber-50 text-amber-700 border-amber-200",
        "on hold" => "bg-purple-50 text-purple-700 border-purple-200",
        "completed" => "bg-green-50 text-green-700 border-green-200",
        "cancelled" => "bg-red-50 text-red-700 border-red-200",
        _ => "bg-gray-50 text-gray-700 border-gray-200",
    }
}

/// Table cell classes for a priority
pub fn table_priority_badge(priority: &str) -> &'static str {
    match priority.to_lowercase().as_str() {
        "low" => "bg-slate-50 text-slate-600 border-slate-200",
        "medium" => "bg-blue-50 text-blue-600 border-blue-200",
        "high" => "bg-orange-50 text-orange-700 border-orange-200",
        _ => "bg-gray-50 text-gray-600 border-gray-200",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workorder_api_client::models::{WorkOrderPriority, WorkOrderStatus};

    #[test]
    fn test_modal_status() {
        assert_eq!(modal_status_badge("Open").bg, "bg-sky-600");
        assert_eq!(modal_status_badge("PENDING"), modal_status_badge("In Progress"));
        assert_eq!(modal_status_badge("resolved").text, "text-emerald-50");
        assert_eq!(modal_status_badge("failed").bg, "bg-rose-600");
        assert_eq!(modal_status_badge("").bg, "bg-slate-500");
        assert_eq!(modal_status_badge("On Hold").border, None);
    }

    #[test]
    fn test_modal_priority() {
        let high = modal_priority_badge("High");
        assert_eq!(high.class_string(), "bg-red-100 text-red-800 border-red-500");
        assert_eq!(modal_priority_badge("critical"), modal_priority_badge("Urgent"));
        assert_eq!(modal_priority_badge("whatever").border, Some("border-gray-500"));
    }

    #[test]
    fn test_table_badges_cover_every_wire_value() {
        for status in WorkOrderStatus::ALL {
            assert_ne!(table_status_badge(status.as_str()), table_status_badge("unknown"), "{status}");
        }
        for priority in WorkOrderPriority::ALL {
            assert_ne!(table_priority_badge(priority.as_str()), table_priority_badge("unknown"));
        }
    }

    #[test]
    fn test_table_defaults() {
        assert_eq!(table_status_badge("Archived"), "bg-gray-50 text-gray-700 border-gray-200");
        assert_eq!(table_priority_badge(""), "bg-gray-50 text-gray-600 border-gray-200");
    }

    #[test]
    fn test_plain_class_string() {
        assert_eq!(modal_status_badge("open").class_string(), "bg-sky-600 text-sky-50");
    }
}
