// Toolbar selection.
// Decides which views get a tab and which live behind the "manage views" list.

use super::views::{View, ViewId};

/// Custom views shown automatically before the user pins anything.
pub const MAX_AUTO: usize = 5;

/// Default view first, then custom views in creation (id) order.
pub fn sorted_views(views: &[View]) -> Vec<&View> {
    let mut sorted: Vec<&View> = views.iter().collect();
    sorted.sort_by_key(|v| (!v.is_default, v.id));
    sorted
}

/// Whether any pinned id names an existing custom view.
pub fn has_real_pins(views: &[View], pinned: &[ViewId]) -> bool {
    views
        .iter()
        .any(|v| !v.is_default && pinned.contains(&v.id))
}

/// Views to render as toolbar tabs, in display order.
///
/// With real pins the toolbar is the default view, the pinned views and the
/// active view. Without them it is the default view plus the first
/// [`MAX_AUTO`] custom views, with the active view appended if it fell outside.
pub fn select_toolbar<'a>(views: &'a [View], pinned: &[ViewId], active: ViewId) -> Vec<&'a View> {
    let sorted = sorted_views(views);

    if has_real_pins(views, pinned) {
        return sorted
            .into_iter()
            .filter(|v| v.is_default || v.id == active || pinned.contains(&v.id))
            .collect();
    }

    let mut custom_shown = 0;
    let mut toolbar: Vec<&View> = sorted
        .iter()
        .copied()
        .filter(|v| {
            if v.is_default {
                return true;
            }
            custom_shown += 1;
            custom_shown <= MAX_AUTO
        })
        .collect();

    if !toolbar.iter().any(|v| v.id == active) {
        if let Some(view) = sorted.iter().find(|v| v.id == active) {
            toolbar.push(*view);
        }
    }
    toolbar
}

/// Views left off the toolbar, in sorted order.
pub fn overflow_views<'a>(views: &'a [View], toolbar: &[&View]) -> Vec<&'a View> {
    sorted_views(views)
        .into_iter()
        .filter(|v| !toolbar.iter().any(|t| t.id == v.id))
        .collect()
}
