use std::fmt;

use crate::ids::FieldId;

/// One step from a container down into one of its child arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The children of a group.
    InContainer(FieldId),
    /// The subtree of one option of a branching field.
    InBranch(FieldId, String),
}

impl Segment {
    pub fn container_id(&self) -> &FieldId {
        match self {
            Segment::InContainer(id) | Segment::InBranch(id, _) => id,
        }
    }
}

/// Address of a child array. The empty path is the document's top level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContainerPath(Vec<Segment>);

impl ContainerPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

impl From<Vec<Segment>> for ContainerPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            match segment {
                Segment::InContainer(id) => write!(f, "/{id}")?,
                Segment::InBranch(id, key) => write!(f, "/{id}[{key}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branches_of_one_field_are_distinct_paths() {
        let root = ContainerPath::root();
        let a = root.child(Segment::InBranch("kind".into(), "a".into()));
        let b = root.child(Segment::InBranch("kind".into(), "b".into()));
        assert_ne!(a, b);
        assert_eq!(a.last().map(Segment::container_id), b.last().map(Segment::container_id));
    }

    #[test]
    fn display_renders_steps() {
        let path = ContainerPath::root()
            .child(Segment::InContainer("details".into()))
            .child(Segment::InBranch("kind".into(), "car".into()));
        assert_eq!(path.to_string(), "/details/kind[car]");
        assert_eq!(ContainerPath::root().to_string(), "/");
        assert_eq!(path.depth(), 2);
    }
}
