// State management module.
// Views, toolbar, editor, visibility and preference state for each page.

pub mod editor;
pub mod notifications;
pub mod preferences;
pub mod toolbar;
pub mod views;
pub mod visibility;

pub use crate::backend::SubscriptionId;
pub use editor::{EditorCommand, EditorMode, EditorState, ViewEditor};
pub use notifications::{Notification, NotificationKind, NotificationLog};
pub use preferences::{Preferences, ViewMode};
pub use toolbar::{MAX_AUTO, overflow_views, select_toolbar};
pub use views::{Membership, View, ViewId, ViewSnapshot, ViewStore, name_key};
pub use visibility::{VisibilityNotifier, visibility_key, visible_subscriptions};
