//! Disjoint sets with a chosen representative.


use fnv::{FnvHashMap, FnvHashSet};
use std::hash::Hash;

/**
Disjoint sets of `T`, where each set has a representative that is chosen when
sets are merged rather than being the set's root.

Elements that were never added behave like singleton sets.

# Laws

* [`UnionFind::find`] is idempotent when `pick` always returns one of its arguments.

  `{ let a = uf.find(x); uf.find(&a) == a }`

* After `uf.union(x, y, pick)`, `uf.find(x) == uf.find(y)`.
*/
#[derive(Debug, Clone)]
pub struct UnionFind<T> {
    parent: FnvHashMap<T, T>,
    rank: FnvHashMap<T, usize>,
    representative: FnvHashMap<T, T>,
}

impl<T: Eq + Hash> Default for UnionFind<T> {
    fn default() -> Self {
        UnionFind {
            parent: FnvHashMap::default(),
            rank: FnvHashMap::default(),
            representative: FnvHashMap::default(),
        }
    }
}

impl<T: Eq + Hash + Clone> UnionFind<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.parent.keys()
    }

    pub fn contains(&self, element: &T) -> bool {
        self.parent.contains_key(element)
    }

    pub fn add(&mut self, element: T) {
        if !self.contains(&element) {
            self.parent.insert(element.clone(), element.clone());
            self.rank.insert(element.clone(), 1);
            self.representative.insert(element.clone(), element);
        }
    }

    fn parent_of(&self, element: &T) -> T {
        self.parent
            .get(element)
            .cloned()
            .unwrap_or_else(|| element.clone())
    }

    fn root(&self, element: &T) -> T {
        let mut current = element.clone();
        loop {
            let parent = self.parent_of(&current);
            if parent == current {
                return current;
            }
            current = parent;
        }
    }

    fn representative_of_root(&self, root: &T) -> T {
        self.representative
            .get(root)
            .cloned()
            .unwrap_or_else(|| root.clone())
    }

    /// The representative of `element`'s set. Compresses the path to the set's root.
    pub fn find(&mut self, element: &T) -> T {
        let root = self.root(element);

        let mut current = element.clone();
        while current != root {
            let next = self.parent_of(&current);
            self.parent.insert(current, root.clone());
            current = next;
        }

        self.representative_of_root(&root)
    }

    /// The representative of every set.
    pub fn representatives(&self) -> FnvHashSet<T> {
        self.parent
            .keys()
            .map(|element| self.representative_of_root(&self.root(element)))
            .collect()
    }

    fn members(&self, root: &T) -> Vec<T> {
        self.parent
            .keys()
            .filter(|element| self.root(element) == *root)
            .cloned()
            .collect()
    }

    /**
    Merge the sets containing `left` and `right`, adding either of them if
    necessary.

    The merged set's representative is `pick(left_representative, right_representative)`.
    */
    pub fn union(&mut self, left: &T, right: &T, pick: impl FnOnce(&T, &T) -> T) {
        self.add(left.clone());
        self.add(right.clone());

        let left_root = self.root(left);
        let right_root = self.root(right);
        if left_root == right_root {
            return;
        }

        let left_rank = self.rank.get(&left_root).copied().unwrap_or(1);
        let right_rank = self.rank.get(&right_root).copied().unwrap_or(1);
        let chosen = pick(
            &self.representative_of_root(&left_root),
            &self.representative_of_root(&right_root),
        );

        let (child, parent, child_rank) = if left_rank < right_rank {
            (left_root, right_root, left_rank)
        } else {
            (right_root, left_root, right_rank)
        };

        self.parent.insert(child.clone(), parent.clone());
        *self.rank.entry(parent.clone()).or_insert(1) += child_rank;
        self.representative.remove(&child);
        self.representative.insert(parent, chosen);
    }

    /**
    Remove `element`, keeping the rest of its set together.

    If `element` was its set's root then one of its children becomes the new
    root. If it was the set's representative, a new representative is picked
    from the remaining members with `pick`.
    */
    pub fn remove(&mut self, element: &T, mut pick: impl FnMut(&T, &T) -> T) {
        if !self.contains(element) {
            return;
        }

        let root = self.root(element);
        let children: Vec<T> = self
            .parent
            .iter()
            .filter(|(child, parent)| *parent == element && *child != element)
            .map(|(child, _)| child.clone())
            .collect();

        self.parent.remove(element);
        self.rank.remove(element);

        let remaining_root = if root == *element {
            let old_representative = self.representative.remove(element);
            let new_root = match children
                .iter()
                .max_by_key(|child| self.rank.get(*child).copied().unwrap_or(1))
            {
                None => return,
                Some(new_root) => new_root.clone(),
            };
            for child in &children {
                self.parent.insert(child.clone(), new_root.clone());
                if *child != new_root {
                    let child_rank = self.rank.get(child).copied().unwrap_or(1);
                    *self.rank.entry(new_root.clone()).or_insert(1) += child_rank;
                }
            }
            if let Some(old_representative) = old_representative {
                self.representative
                    .insert(new_root.clone(), old_representative);
            }
            new_root
        } else {
            for child in children {
                self.parent.insert(child, root.clone());
            }
            root
        };

        if self
            .representative
            .get(&remaining_root)
            .map_or(true, |representative| representative == element)
        {
            let representative = self
                .members(&remaining_root)
                .into_iter()
                .reduce(|left, right| pick(&left, &right))
                .unwrap_or_else(|| remaining_root.clone());
            self.representative.insert(remaining_root, representative);
        }
    }

    /**
    Rewrite the representative of every set.

    `f` receives the union-find itself, the set's root, and its current
    representative.
    */
    pub fn update_with(&mut self, mut f: impl FnMut(&mut Self, &T, &T) -> T) {
        let entries: Vec<(T, T)> = self
            .representative
            .iter()
            .map(|(root, representative)| (root.clone(), representative.clone()))
            .collect();
        for (root, representative) in entries {
            let updated = f(self, &root, &representative);
            self.representative.insert(root, updated);
        }
    }
}
