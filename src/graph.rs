//! # Named Set Declarations
//!
//! [`Depset::new`](crate::depset::Depset::new) only accepts sets that already
//! exist, so a set built directly can never contain itself. Sets declared by
//! name are different: a declaration may mention children that are declared
//! later, and a typo or a careless edit can close a loop.
//!
//! A [`DepsetGraph`] collects such declarations and turns them into
//! [`Depset`] values on request. Resolution walks the declarations depth
//! first with an explicit stack, keeping the current path. If a set's children lead back to the
//! set itself, resolution fails with `CyclicReference` and reports the loop
//! (`a -> b -> a`). Resolved sets are kept in a map local to the call, so a
//! failed resolution leaves nothing behind and a child shared by many
//! parents is built exactly once.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::depset::{Depset, Order};
use crate::error::{Error, Result};

/// A set declared by name.
#[derive(Debug, Clone)]
pub struct Declaration<T> {
    name: String,
    direct: Vec<T>,
    transitive: Vec<String>,
    order: Order,
}

impl<T> Declaration<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direct(&self) -> &[T] {
        &self.direct
    }

    /// Names of the child sets, in declaration order.
    pub fn transitive(&self) -> &[String] {
        &self.transitive
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

/// Declarations keyed by name, kept in declaration order.
#[derive(Debug, Clone)]
pub struct DepsetGraph<T> {
    declarations: Vec<Declaration<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for DepsetGraph<T> {
    fn default() -> Self {
        Self {
            declarations: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> DepsetGraph<T> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a set. Children are referenced by name and need not exist yet.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        direct: Vec<T>,
        transitive: Vec<String>,
        order: Order,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateDepset { name });
        }
        if transitive.iter().any(|child| *child == name) {
            warn!("Set '{}' lists itself as a child", name);
        }

        self.index.insert(name.clone(), self.declarations.len());
        self.declarations.push(Declaration {
            name,
            direct,
            transitive,
            order,
        });
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Declaration<T>> {
        self.index.get(name).map(|&i| &self.declarations[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl<T: Clone> DepsetGraph<T> {
    /// Builds the set declared as `name`, together with everything it reaches.
    pub fn resolve(&self, name: &str) -> Result<Depset<T>> {
        let mut built = HashMap::new();
        self.resolve_into(name, &mut built)
    }

    /// Builds every declared set, sharing nodes between them.
    ///
    /// Fails on the first undeclared reference, order mismatch or cycle; in
    /// that case no set is returned.
    pub fn resolve_all(&self) -> Result<HashMap<String, Depset<T>>> {
        let mut built = HashMap::with_capacity(self.len());
        for name in self.names() {
            self.resolve_into(name, &mut built)?;
        }
        debug!("Resolved {} sets", built.len());
        Ok(built
            .into_iter()
            .map(|(name, set)| (name.to_string(), set))
            .collect())
    }

    fn declaration(&self, name: &str) -> Result<&Declaration<T>> {
        self.get(name).ok_or_else(|| Error::UnknownDepset {
            name: name.to_string(),
        })
    }

    /// Depth-first build with an explicit stack of `(declaration, next child)`
    /// frames, so declaration chains of any length resolve without recursion.
    /// The stack is the current path; `on_path` mirrors it for lookups.
    fn resolve_into<'a>(
        &'a self,
        root: &str,
        built: &mut HashMap<&'a str, Depset<T>>,
    ) -> Result<Depset<T>> {
        if let Some(set) = built.get(root) {
            return Ok(set.clone());
        }

        let root = self.declaration(root)?;
        let mut stack: Vec<(&'a Declaration<T>, usize)> = vec![(root, 0)];
        let mut on_path: HashSet<&'a str> = HashSet::from([root.name.as_str()]);

        while let Some((declaration, next)) = stack.last_mut() {
            let declaration: &'a Declaration<T> = *declaration;

            if let Some(child) = declaration.transitive.get(*next) {
                *next += 1;
                let child = child.as_str();
                if built.contains_key(child) {
                    continue;
                }
                if on_path.contains(child) {
                    let start = stack
                        .iter()
                        .position(|(entry, _)| entry.name == child)
                        .unwrap_or(0);
                    let mut cycle: Vec<&str> = stack[start..]
                        .iter()
                        .map(|(entry, _)| entry.name.as_str())
                        .collect();
                    cycle.push(child);
                    return Err(Error::CyclicReference {
                        cycle: cycle.join(" -> "),
                    });
                }
                let child = self.declaration(child)?;
                on_path.insert(child.name.as_str());
                stack.push((child, 0));
                continue;
            }

            // Every child is built once the frame has walked its whole list.
            let children = declaration
                .transitive
                .iter()
                .filter_map(|child| built.get(child.as_str()).cloned())
                .collect();
            let set = Depset::new(declaration.direct.clone(), children, declaration.order)?;
            built.insert(declaration.name.as_str(), set);
            on_path.remove(declaration.name.as_str());
            stack.pop();
        }

        built
            .get(root.name.as_str())
            .cloned()
            .ok_or_else(|| Error::UnknownDepset {
                name: root.name.clone(),
            })
    }

    /// Convenience for resolving a set and flattening it in one step.
    pub fn flatten(&self, name: &str) -> Result<Vec<T>>
    where
        T: Eq + std::hash::Hash,
    {
        Ok(self.resolve(name)?.flatten())
    }
}
