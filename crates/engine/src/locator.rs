use formtree_core::{ContainerPath, Field, FieldBody, FieldId, Segment};

use crate::error::EngineError;

/// Where a field lives: the array holding it, its index there, and the path
/// from the document root to that array.
#[derive(Debug, Clone)]
pub struct Location<'a> {
    pub siblings: &'a [Field],
    pub index: usize,
    pub path: ContainerPath,
}

impl<'a> Location<'a> {
    pub fn field(&self) -> &'a Field {
        &self.siblings[self.index]
    }
}

/// Depth-first search for `target`, descending into group children and into
/// every branch subtree.
pub fn locate<'a>(root: &'a [Field], target: &FieldId) -> Result<Location<'a>, EngineError> {
    search(root, target, &ContainerPath::root()).ok_or_else(|| EngineError::NotFound(target.clone()))
}

fn search<'a>(fields: &'a [Field], target: &FieldId, path: &ContainerPath) -> Option<Location<'a>> {
    if let Some(index) = fields.iter().position(|f| &f.id == target) {
        return Some(Location {
            siblings: fields,
            index,
            path: path.clone(),
        });
    }
    for field in fields {
        let found = match &field.body {
            FieldBody::Leaf { .. } => None,
            FieldBody::Group { children, .. } => {
                search(children, target, &path.child(Segment::InContainer(field.id.clone())))
            }
            FieldBody::Branch { options, .. } => options.iter().find_map(|option| {
                let step = Segment::InBranch(field.id.clone(), option.key.clone());
                search(&option.subtree, target, &path.child(step))
            }),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Resolve a path to the child array it names.
pub fn list_at<'a>(root: &'a [Field], path: &[Segment]) -> Option<&'a [Field]> {
    let Some((first, rest)) = path.split_first() else {
        return Some(root);
    };
    let container = root.iter().find(|f| &f.id == first.container_id())?;
    let list = match (first, &container.body) {
        (Segment::InContainer(_), FieldBody::Group { children, .. }) => children.as_slice(),
        (Segment::InBranch(_, key), FieldBody::Branch { options, .. }) => {
            options.iter().find(|o| &o.key == key)?.subtree.as_slice()
        }
        _ => return None,
    };
    list_at(list, rest)
}

pub fn list_at_mut<'a>(root: &'a mut Vec<Field>, path: &[Segment]) -> Option<&'a mut Vec<Field>> {
    let Some((first, rest)) = path.split_first() else {
        return Some(root);
    };
    let container = root.iter_mut().find(|f| &f.id == first.container_id())?;
    let list = match (first, &mut container.body) {
        (Segment::InContainer(_), FieldBody::Group { children, .. }) => children,
        (Segment::InBranch(_, key), FieldBody::Branch { options, .. }) => {
            &mut options.iter_mut().find(|o| &o.key == key)?.subtree
        }
        _ => return None,
    };
    list_at_mut(list, rest)
}

/// Column count governing the array at `path`.
pub fn columns_at(root: &[Field], root_columns: u32, path: &ContainerPath) -> Option<u32> {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return Some(root_columns);
    };
    list_at(root, parents)?
        .iter()
        .find(|f| &f.id == last.container_id())?
        .container_columns()
}

pub fn find<'a>(fields: &'a [Field], id: &FieldId) -> Option<&'a Field> {
    locate(fields, id).ok().map(|loc| loc.field())
}

pub fn find_mut<'a>(fields: &'a mut [Field], id: &FieldId) -> Option<&'a mut Field> {
    for field in fields.iter_mut() {
        if &field.id == id {
            return Some(field);
        }
        for list in field.child_lists_mut() {
            if let Some(found) = find_mut(list, id) {
                return Some(found);
            }
        }
    }
    None
}
