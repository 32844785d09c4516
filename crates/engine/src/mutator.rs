//! Tree edits. Every operation takes the current field list by reference,
//! leaves it untouched, and returns the edited copy or an error.

use std::collections::HashSet;
use std::num::NonZeroU32;

use formtree_core::{BranchOption, Field, FieldBody, FieldId, FieldValue, field::walk};

use crate::error::EngineError;
use crate::locator::{find, find_mut, list_at_mut, locate};

/// Apply `edit` to the field `id` in a copy of `root`.
fn with_field(
    root: &[Field],
    id: &FieldId,
    edit: impl FnOnce(&mut Field) -> Result<(), EngineError>,
) -> Result<Vec<Field>, EngineError> {
    let mut next = root.to_vec();
    let field = find_mut(&mut next, id).ok_or_else(|| EngineError::NotFound(id.clone()))?;
    edit(field)?;
    Ok(next)
}

/// First id that appears twice anywhere in the tree.
pub fn first_duplicate(fields: &[Field]) -> Option<FieldId> {
    let mut seen = HashSet::new();
    let mut duplicate = None;
    walk(fields, &mut |f| {
        if duplicate.is_none() && !seen.insert(&f.id) {
            duplicate = Some(f.id.clone());
        }
    });
    duplicate
}

fn ensure_unique(fields: &[Field]) -> Result<(), EngineError> {
    match first_duplicate(fields) {
        Some(id) => Err(EngineError::DuplicateId(id)),
        None => Ok(()),
    }
}

/// Reject `incoming` if any id in its subtree already exists in `root`.
fn ensure_fresh(root: &[Field], incoming: &Field) -> Result<(), EngineError> {
    let mut clash = None;
    walk(std::slice::from_ref(incoming), &mut |f| {
        if clash.is_none() && find(root, &f.id).is_some() {
            clash = Some(f.id.clone());
        }
    });
    match clash {
        Some(id) => Err(EngineError::DuplicateId(id)),
        None => ensure_unique(std::slice::from_ref(incoming)),
    }
}

fn clamp_spans(list: &mut [Field], columns: u32) {
    for field in list {
        field.col_span = field.col_span.min(columns);
    }
}

pub fn update_by_id(
    root: &[Field],
    id: &FieldId,
    f: impl FnOnce(Field) -> Field,
) -> Result<Vec<Field>, EngineError> {
    let next = with_field(root, id, |field| {
        *field = f(field.clone());
        Ok(())
    })?;
    ensure_unique(&next)?;
    Ok(next)
}

/// Delete a field together with its whole subtree.
pub fn remove_by_id(root: &[Field], id: &FieldId) -> Result<Vec<Field>, EngineError> {
    let loc = locate(root, id)?;
    let (path, index) = (loc.path, loc.index);
    let mut next = root.to_vec();
    let list = list_at_mut(&mut next, path.segments()).ok_or_else(|| EngineError::NotFound(id.clone()))?;
    list.remove(index);
    Ok(next)
}

/// Append a field to the top level of the document.
pub fn append_top_level(
    root: &[Field],
    root_columns: u32,
    mut new_field: Field,
) -> Result<Vec<Field>, EngineError> {
    ensure_fresh(root, &new_field)?;
    new_field.is_child = false;
    new_field.col_span = new_field.col_span.clamp(1, root_columns.max(1));
    let mut next = root.to_vec();
    next.push(new_field);
    Ok(next)
}

/// Append `new_field` to a group's children, or to the subtree of
/// `branch_key` on a branching field.
pub fn insert_into_container(
    root: &[Field],
    container_id: &FieldId,
    mut new_field: Field,
    branch_key: Option<&str>,
) -> Result<Vec<Field>, EngineError> {
    let container = find(root, container_id)
        .filter(|f| f.is_container())
        .ok_or_else(|| EngineError::ContainerNotFound(container_id.clone()))?;
    ensure_fresh(root, &new_field)?;

    let branch_not_found = |key: Option<&str>| EngineError::BranchNotFound {
        container: container_id.clone(),
        key: key.unwrap_or_default().to_string(),
    };
    match (&container.body, branch_key) {
        (FieldBody::Group { .. }, Some(key)) => return Err(branch_not_found(Some(key))),
        (FieldBody::Branch { .. }, None) => return Err(branch_not_found(None)),
        (FieldBody::Branch { .. }, Some(key)) => {
            if container.branch_option(key).is_none() {
                return Err(branch_not_found(Some(key)));
            }
            if new_field.is_container() {
                return Err(EngineError::TypeNotAllowedAsChild(new_field.kind()));
            }
        }
        _ => {}
    }

    with_field(root, container_id, |container| {
        new_field.is_child = true;
        match &mut container.body {
            FieldBody::Group { columns, children } => {
                new_field.col_span = new_field.col_span.clamp(1, *columns);
                children.push(new_field);
            }
            FieldBody::Branch { columns, options, .. } => {
                new_field.col_span = new_field.col_span.clamp(1, *columns);
                let key = branch_key.unwrap_or_default();
                if let Some(option) = options.iter_mut().find(|o| o.key == key) {
                    option.subtree.push(new_field);
                }
            }
            FieldBody::Leaf { .. } => {}
        }
        Ok(())
    })
}

pub fn rename_id(root: &[Field], old_id: &FieldId, new_id: &FieldId) -> Result<Vec<Field>, EngineError> {
    if new_id.is_blank() {
        return Err(EngineError::EmptyId);
    }
    if find(root, old_id).is_none() {
        return Err(EngineError::NotFound(old_id.clone()));
    }
    if old_id == new_id {
        return Ok(root.to_vec());
    }
    if find(root, new_id).is_some() {
        return Err(EngineError::DuplicateId(new_id.clone()));
    }
    with_field(root, old_id, |field| {
        field.id = new_id.clone();
        Ok(())
    })
}

/// Move `moved_id` to the position `target_id` holds, shifting the fields in
/// between by one. Both must share the same child array.
pub fn reorder(root: &[Field], moved_id: &FieldId, target_id: &FieldId) -> Result<Vec<Field>, EngineError> {
    let moved = locate(root, moved_id)?;
    let target = locate(root, target_id)?;
    if moved.path != target.path {
        return Err(EngineError::CrossContainerMove {
            moved: moved_id.clone(),
            target: target_id.clone(),
        });
    }
    let (from, to, path) = (moved.index, target.index, moved.path);
    let mut next = root.to_vec();
    if from != to {
        let list = list_at_mut(&mut next, path.segments())
            .ok_or_else(|| EngineError::NotFound(moved_id.clone()))?;
        let item = list.remove(from);
        list.insert(to, item);
    }
    Ok(next)
}

/// Change a container's column count and clamp its direct children's spans
/// in the same edit.
pub fn set_container_columns(
    root: &[Field],
    container_id: &FieldId,
    columns: NonZeroU32,
) -> Result<Vec<Field>, EngineError> {
    if !find(root, container_id).is_some_and(Field::is_container) {
        return Err(EngineError::ContainerNotFound(container_id.clone()));
    }
    let n = columns.get();
    with_field(root, container_id, |container| {
        match &mut container.body {
            FieldBody::Group { columns, .. } | FieldBody::Branch { columns, .. } => *columns = n,
            FieldBody::Leaf { .. } => {}
        }
        for list in container.child_lists_mut() {
            clamp_spans(list, n);
        }
        Ok(())
    })
}

/// Clamp top-level spans after the document's own column count changed.
pub fn clamp_top_level(root: &[Field], columns: NonZeroU32) -> Vec<Field> {
    let mut next = root.to_vec();
    clamp_spans(&mut next, columns.get());
    next
}

/// Set a field's span, clamped into `1..=` its container's column count.
pub fn set_col_span(
    root: &[Field],
    root_columns: u32,
    id: &FieldId,
    span: u32,
) -> Result<Vec<Field>, EngineError> {
    let loc = locate(root, id)?;
    let limit = crate::locator::columns_at(root, root_columns, &loc.path).unwrap_or(root_columns);
    with_field(root, id, |field| {
        field.col_span = span.clamp(1, limit.max(1));
        Ok(())
    })
}

/// Store an instance value. For branching fields the value is the selected
/// key, given as text; `Empty` or an empty string clears the selection.
pub fn set_value(root: &[Field], id: &FieldId, value: FieldValue) -> Result<Vec<Field>, EngineError> {
    with_field(root, id, |field| {
        let mismatch = EngineError::ValueMismatch {
            field: field.id.clone(),
            expected: field.kind(),
        };
        match &mut field.body {
            FieldBody::Leaf { kind, value: slot, .. } => {
                let shape = kind.shape();
                if !value.fits(shape) {
                    return Err(mismatch);
                }
                *slot = value.normalized_for(shape);
            }
            FieldBody::Branch { selected, options, .. } => match value {
                FieldValue::Empty => *selected = None,
                FieldValue::Text(key) if key.is_empty() => *selected = None,
                FieldValue::Text(key) => {
                    if !options.iter().any(|o| o.key == key) {
                        return Err(EngineError::BranchNotFound {
                            container: id.clone(),
                            key,
                        });
                    }
                    *selected = Some(key);
                }
                _ => return Err(mismatch),
            },
            FieldBody::Group { .. } => return Err(mismatch),
        }
        Ok(())
    })
}

fn branch_options_mut<'a>(
    field: &'a mut Field,
) -> Result<(&'a mut Option<String>, &'a mut Vec<BranchOption>), EngineError> {
    match &mut field.body {
        FieldBody::Branch { selected, options, .. } => Ok((selected, options)),
        _ => Err(EngineError::ContainerNotFound(field.id.clone())),
    }
}

pub fn add_branch_option(root: &[Field], id: &FieldId, key: &str) -> Result<Vec<Field>, EngineError> {
    if find(root, id).is_none() {
        return Err(EngineError::ContainerNotFound(id.clone()));
    }
    with_field(root, id, |field| {
        let (_, options) = branch_options_mut(field)?;
        if key.trim().is_empty() {
            return Err(EngineError::EmptyBranchKey);
        }
        if options.iter().any(|o| o.key == key) {
            return Err(EngineError::DuplicateBranchKey {
                container: id.clone(),
                key: key.to_string(),
            });
        }
        options.push(BranchOption::new(key));
        Ok(())
    })
}

/// Drop a branch and its subtree; a selection pointing at it is cleared.
pub fn remove_branch_option(root: &[Field], id: &FieldId, key: &str) -> Result<Vec<Field>, EngineError> {
    if find(root, id).is_none() {
        return Err(EngineError::ContainerNotFound(id.clone()));
    }
    with_field(root, id, |field| {
        let (selected, options) = branch_options_mut(field)?;
        let index = options
            .iter()
            .position(|o| o.key == key)
            .ok_or_else(|| EngineError::BranchNotFound {
                container: id.clone(),
                key: key.to_string(),
            })?;
        options.remove(index);
        if selected.as_deref() == Some(key) {
            *selected = None;
        }
        Ok(())
    })
}

/// Rename a branch key in place; its subtree and any selection follow it.
pub fn rename_branch_option(
    root: &[Field],
    id: &FieldId,
    old_key: &str,
    new_key: &str,
) -> Result<Vec<Field>, EngineError> {
    if find(root, id).is_none() {
        return Err(EngineError::ContainerNotFound(id.clone()));
    }
    with_field(root, id, |field| {
        let (selected, options) = branch_options_mut(field)?;
        if new_key.trim().is_empty() {
            return Err(EngineError::EmptyBranchKey);
        }
        let index = options
            .iter()
            .position(|o| o.key == old_key)
            .ok_or_else(|| EngineError::BranchNotFound {
                container: id.clone(),
                key: old_key.to_string(),
            })?;
        if old_key != new_key && options.iter().any(|o| o.key == new_key) {
            return Err(EngineError::DuplicateBranchKey {
                container: id.clone(),
                key: new_key.to_string(),
            });
        }
        options[index].key = new_key.to_string();
        if selected.as_deref() == Some(old_key) {
            *selected = Some(new_key.to_string());
        }
        Ok(())
    })
}

/// Replace the option labels of a plain choice field.
pub fn set_choice_options(
    root: &[Field],
    id: &FieldId,
    new_options: Vec<String>,
) -> Result<Vec<Field>, EngineError> {
    with_field(root, id, |field| {
        let FieldBody::Leaf { kind, options, .. } = &mut field.body else {
            return Err(EngineError::NotAChoiceField(field.id.clone()));
        };
        if !kind.has_choice_options() {
            return Err(EngineError::NotAChoiceField(field.id.clone()));
        }
        let mut seen = HashSet::new();
        for option in &new_options {
            if option.trim().is_empty() {
                return Err(EngineError::EmptyOption);
            }
            if !seen.insert(option.as_str()) {
                return Err(EngineError::DuplicateOption {
                    field: id.clone(),
                    option: option.clone(),
                });
            }
        }
        *options = new_options;
        Ok(())
    })
}
