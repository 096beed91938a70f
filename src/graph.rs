use crate::error::ResolveError;
use crate::metadata::DependencyNode;

/// Nesting depth beyond which a dependency tree is treated as malformed.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Collects every field name reachable from `node`, in pre-order.
///
/// `root_field` only names the tree in the error when the depth bound is hit.
pub fn flatten(
    root_field: &str,
    node: &DependencyNode,
    max_depth: usize,
) -> Result<Vec<String>, ResolveError> {
    let mut fields = Vec::new();
    collect(root_field, node, 1, max_depth, &mut fields)?;
    Ok(fields)
}

fn collect(
    root_field: &str,
    node: &DependencyNode,
    depth: usize,
    max_depth: usize,
    fields: &mut Vec<String>,
) -> Result<(), ResolveError> {
    if node.is_empty() {
        return Ok(());
    }
    if depth > max_depth {
        return Err(ResolveError::MalformedDependencyGraph {
            field: root_field.to_string(),
            max_depth,
        });
    }
    for (field, nested) in node.children() {
        fields.push(field.to_string());
        collect(root_field, nested, depth + 1, max_depth, fields)?;
    }
    Ok(())
}
