//! UI state and presentation helpers for the work-order front end
//!
//! This crate provides:
//! - Toast notifications with timed auto-dismissal
//! - An observable auth store fed by the session provider
//! - Badge classes for statuses and priorities
//! - Navigation link state and shared UI constants

#![warn(missing_docs)]

pub mod auth_store;
pub mod badge;
pub mod constants;
pub mod navigation;
pub mod toast;

pub use auth_store::{AuthState, AuthStore, AuthSubscription};
pub use badge::{modal_priority_badge, modal_status_badge, table_priority_badge, table_status_badge, BadgeClasses};
pub use navigation::{is_nav_link_active, nav_link_classes};
pub use toast::{Toast, ToastKind, ToastStore, DEFAULT_TOAST_DURATION};
