/*!
The command tree: a trie of path segments, where every leaf is bound to
exactly one [`EntryPoint`] and every other node is a branch.
 */

use std::{collections::BTreeMap, fmt};

use joinery::JoinableIterator;
use tracing::debug;

use crate::{entry::EntryPoint, errors::DeclarationError, util};

/// A validated command path: zero or more segments. The zero-segment path is
/// the root, and is declared with the [`ROOT`][CommandPath::ROOT] sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommandPath {
    segments: Vec<String>,
}

impl CommandPath {
    /// The sentinel that declares an entry point at the root of the tree
    pub const ROOT: &'static str = ":root";

    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a space-separated path like `"remote add"`
    pub fn parse(path: &str) -> Result<Self, DeclarationError> {
        if path == Self::ROOT {
            return Ok(Self::root());
        }

        let segments: Vec<String> = path.split(' ').map(str::to_owned).collect();

        match segments
            .iter()
            .find(|segment| !util::is_segment_name(segment))
        {
            Some(segment) => Err(DeclarationError::InvalidSegment {
                path: path.to_owned(),
                segment: segment.clone(),
            }),
            None => Ok(Self { segments }),
        }
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments joined with spaces; empty for the root
    pub fn words(&self) -> impl fmt::Display + '_ {
        self.segments.iter().join_with(" ")
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.is_root() {
            true => f.write_str(Self::ROOT),
            false => write!(f, "{}", self.words()),
        }
    }
}

/// A node in the [`CommandTree`]. Either a branch, with children, or a leaf
/// bound to an entry point; never both.
#[derive(Debug, Default)]
pub struct CommandNode {
    children: BTreeMap<String, CommandNode>,
    entry: Option<EntryPoint>,
}

impl CommandNode {
    #[inline]
    #[must_use]
    pub fn entry_point(&self) -> Option<&EntryPoint> {
        self.entry.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&CommandNode> {
        self.children.get(segment)
    }

    /// The names of this node's children, in sorted order
    pub fn child_names(&self) -> impl Iterator<Item = &str> + Clone {
        self.children.keys().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn is_branch(&self) -> bool {
        self.entry.is_none()
    }
}

/**
The trie of declared commands. Declarations can arrive in any order: any
set of declarations that is accepted produces the same tree, and any
conflict (a path that extends another entry point, or is a prefix of one)
is rejected whichever of the two paths arrives first.
 */
#[derive(Debug, Default)]
pub struct CommandTree {
    root: CommandNode,
    entry_points: usize,
}

impl CommandTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Number of declared entry points
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_points
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_points == 0
    }

    /// Find the node at `path`, if there is one
    #[must_use]
    pub fn find(&self, path: &CommandPath) -> Option<&CommandNode> {
        self.walk(path.segments())
    }

    /// Follow `segments` down from the root
    #[must_use]
    pub fn walk(&self, segments: &[String]) -> Option<&CommandNode> {
        segments
            .iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Bind an entry point to its path. The tree is unchanged if this fails.
    pub fn declare(&mut self, entry: EntryPoint) -> Result<(), DeclarationError> {
        self.check(entry.path())?;

        let node = entry
            .path()
            .segments()
            .iter()
            .fold(&mut self.root, |node, segment| {
                node.children.entry(segment.clone()).or_default()
            });

        debug!(path = %entry.path(), "declared entry point");
        node.entry = Some(entry);
        self.entry_points += 1;

        Ok(())
    }

    fn check(&self, path: &CommandPath) -> Result<(), DeclarationError> {
        if path.is_root() {
            return match (self.root.entry.is_some(), self.is_empty()) {
                (true, _) => Err(DeclarationError::DuplicateEntryPoint(path.to_string())),
                (false, false) => Err(DeclarationError::RootConflict(path.to_string())),
                (false, true) => Ok(()),
            };
        }

        if self.root.entry.is_some() {
            return Err(DeclarationError::RootConflict(path.to_string()));
        }

        let mut node = &self.root;

        for (depth, segment) in path.segments().iter().enumerate() {
            node = match node.children.get(segment) {
                None => return Ok(()),
                Some(child) => child,
            };

            let is_last = depth + 1 == path.segments().len();

            if node.entry.is_some() {
                return Err(match is_last {
                    true => DeclarationError::DuplicateEntryPoint(path.to_string()),
                    false => DeclarationError::ExtendsEntryPoint {
                        path: path.to_string(),
                        prefix: path.segments()[..=depth].iter().join_with(" ").to_string(),
                    },
                });
            }
        }

        // The whole path already exists as a branch
        Err(DeclarationError::HasSubPaths(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::entry::EntryPointDecl;

    fn entry(path: &str) -> EntryPoint {
        EntryPoint::build(
            EntryPointDecl::new(path, |_| Ok(())),
            CommandPath::parse(path).unwrap(),
            None,
        )
        .unwrap()
    }

    fn declare_all(paths: &[&str]) -> Result<CommandTree, DeclarationError> {
        let mut tree = CommandTree::new();
        paths
            .iter()
            .try_for_each(|path| tree.declare(entry(path)))?;
        Ok(tree)
    }

    #[rstest]
    #[case("build")]
    #[case("remote add")]
    #[case(":root")]
    fn valid_paths(#[case] path: &str) {
        CommandPath::parse(path).unwrap();
    }

    #[rstest]
    #[case("")]
    #[case("Build")]
    #[case("remote  add")]
    #[case("remote help")]
    #[case("-v")]
    fn invalid_paths(#[case] path: &str) {
        assert!(matches!(
            CommandPath::parse(path),
            Err(DeclarationError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn root_path_displays_as_sentinel() {
        assert_eq!(CommandPath::root().to_string(), ":root");
        assert_eq!(CommandPath::parse("a b").unwrap().to_string(), "a b");
    }

    #[rstest]
    #[case(&["a", "a b"])]
    #[case(&["a b", "a"])]
    #[case(&["a", "a"])]
    #[case(&["x y", "x y"])]
    #[case(&["x y z", "x"])]
    #[case(&[":root", "a"])]
    #[case(&["a", ":root"])]
    #[case(&[":root", ":root"])]
    fn conflicting_declarations(#[case] paths: &[&str]) {
        assert!(declare_all(paths).is_err());
    }

    #[test]
    fn prefix_collision_errors_name_the_conflict() {
        assert_eq!(
            declare_all(&["a", "a b"]).unwrap_err(),
            DeclarationError::ExtendsEntryPoint {
                path: "a b".to_owned(),
                prefix: "a".to_owned()
            }
        );
        assert_eq!(
            declare_all(&["a b", "a"]).unwrap_err(),
            DeclarationError::HasSubPaths("a".to_owned())
        );
    }

    #[rstest]
    #[case(&["build", "remote add", "remote remove"])]
    #[case(&["remote remove", "build", "remote add"])]
    #[case(&["remote add", "remote remove", "build"])]
    fn declaration_order_does_not_matter(#[case] paths: &[&str]) {
        let tree = declare_all(paths).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root().child_names().collect::<Vec<_>>(), ["build", "remote"]);

        let remote = tree.find(&CommandPath::parse("remote").unwrap()).unwrap();
        assert!(remote.is_branch());
        assert_eq!(remote.child_names().collect::<Vec<_>>(), ["add", "remove"]);

        let add = tree.find(&CommandPath::parse("remote add").unwrap()).unwrap();
        assert_eq!(add.entry_point().unwrap().path().to_string(), "remote add");
    }

    #[test]
    fn root_entry_point_alone() {
        let tree = declare_all(&[":root"]).unwrap();
        assert!(tree.root().entry_point().is_some());
        assert_eq!(tree.find(&CommandPath::root()).map(CommandNode::is_branch), Some(false));
    }
}
