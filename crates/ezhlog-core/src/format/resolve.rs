use super::error::UnresolvedFormat;
use super::layout::LayoutId;

/// Pick the layout for a dump.
///
/// No revision embeds a magic number or version tag, so a caller-supplied
/// hint is trusted outright and never cross-checked against byte content.
/// Without a hint there is nothing to probe and resolution fails.
pub fn resolve_layout(hint: Option<LayoutId>) -> Result<LayoutId, UnresolvedFormat> {
    hint.ok_or(UnresolvedFormat)
}
