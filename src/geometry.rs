//! Site selection rules.
//!
//! A [`Geometry`] turns a step index into the concrete site groups an
//! operation acts on. Sites are 0-based.
//!
//! # Overview
//!
//! - [`Geometry::Site`] / [`Geometry::Pair`] - fixed placements
//! - [`Geometry::Pattern`] - compound layouts expanding into many groups
//! - [`Geometry::Staircase`] - a pointer that moves one bond per use

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Boundary condition of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Open,
    Periodic,
}

/// Direction a [`Staircase`] moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

/// Compound layouts expanding into several site groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum Pattern {
    /// Every site on its own: `[0], [1], ..., [n-1]`.
    AllSites,
    /// Every nearest-neighbour bond, see [`pair_chain`] and [`pair_ring`].
    AllBonds,
    /// Non-overlapping bonds starting at `parity` (0 = even layer, 1 = odd).
    Brickwork { parity: usize },
    /// Brickwork whose parity flips every step: `(step + offset) mod 2`.
    AlternatingBrickwork { offset: usize },
}

/// Open chain bonds: [(0,1), (1,2), ..., (n-2,n-1)]
pub fn pair_chain(n: usize) -> Vec<(usize, usize)> {
    (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect()
}

/// Ring bonds: [(0,1), (1,2), ..., (n-2,n-1), (n-1,0)]
pub fn pair_ring(n: usize) -> Vec<(usize, usize)> {
    (0..n).map(|i| (i, (i + 1) % n)).collect()
}

fn bonds(n: usize, topology: Topology) -> Vec<(usize, usize)> {
    match topology {
        Topology::Open => pair_chain(n),
        Topology::Periodic => pair_ring(n),
    }
}

fn require_sites(required: usize, num_sites: usize) -> Result<()> {
    if num_sites < required {
        return Err(Error::TooFewSites {
            required,
            num_sites,
        });
    }
    Ok(())
}

fn check_site(site: usize, num_sites: usize) -> Result<()> {
    if site >= num_sites {
        return Err(Error::SiteOutOfRange { site, num_sites });
    }
    Ok(())
}

impl Pattern {
    /// Expand into site groups for the given (1-based) step.
    pub fn expand(&self, step: usize, num_sites: usize, topology: Topology) -> Result<Vec<Vec<usize>>> {
        match *self {
            Pattern::AllSites => {
                require_sites(1, num_sites)?;
                Ok((0..num_sites).map(|i| vec![i]).collect())
            }
            Pattern::AllBonds => {
                require_sites(2, num_sites)?;
                Ok(bonds(num_sites, topology)
                    .into_iter()
                    .map(|(a, b)| vec![a, b])
                    .collect())
            }
            Pattern::Brickwork { parity } => brick_layer(parity % 2, num_sites, topology),
            Pattern::AlternatingBrickwork { offset } => {
                brick_layer((step + offset) % 2, num_sites, topology)
            }
        }
    }
}

/// One brick layer. The wrap-around bond `(n-1, 0)` only joins an odd layer
/// on an even-length ring; odd rings would overlap the first brick.
fn brick_layer(parity: usize, num_sites: usize, topology: Topology) -> Result<Vec<Vec<usize>>> {
    require_sites(2, num_sites)?;
    let wraps = topology == Topology::Periodic && num_sites % 2 == 0;
    Ok((parity..num_sites)
        .step_by(2)
        .filter(|&i| i + 1 < num_sites || wraps)
        .map(|i| vec![i, (i + 1) % num_sites])
        .collect())
}

/// A pointer over bonds that moves one position each time it is resolved.
///
/// A right-moving pointer at `p` acts on the bond `(p, p+1)`; a left-moving
/// pointer acts on the bond `(p-1, p)`. On a ring both wrap around. On an
/// open chain the pointer never lands on a bond that leaves the chain: a
/// right pointer cycles through `0..=n-2`, a left pointer through `1..=n-1`.
///
/// # Example
/// ```
/// use qtraj::geometry::{Staircase, Topology};
///
/// let mut s = Staircase::right(3);
/// assert_eq!(s.resolve(4, Topology::Periodic).unwrap(), vec![3, 0]);
/// assert_eq!(s.position(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staircase {
    direction: Direction,
    position: usize,
}

impl Staircase {
    pub fn new(direction: Direction, start: usize) -> Self {
        Staircase {
            direction,
            position: start,
        }
    }

    pub fn right(start: usize) -> Self {
        Self::new(Direction::Right, start)
    }

    pub fn left(start: usize) -> Self {
        Self::new(Direction::Left, start)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// The bond a pointer at `position` acts on. Pure.
    pub fn bond_at(
        direction: Direction,
        position: usize,
        num_sites: usize,
        topology: Topology,
    ) -> Result<Vec<usize>> {
        require_sites(2, num_sites)?;
        check_site(position, num_sites)?;
        let n = num_sites;
        let bond = match (direction, topology) {
            (Direction::Right, Topology::Periodic) => vec![position, (position + 1) % n],
            (Direction::Right, Topology::Open) => {
                let first = position.min(n - 2);
                vec![first, first + 1]
            }
            (Direction::Left, Topology::Periodic) => vec![(position + n - 1) % n, position],
            (Direction::Left, Topology::Open) => {
                let second = position.max(1);
                vec![second - 1, second]
            }
        };
        Ok(bond)
    }

    /// Position after one move from `position`. Pure.
    ///
    /// An empty chain has nowhere to move; `position` is returned unchanged.
    pub fn advance(direction: Direction, position: usize, num_sites: usize, topology: Topology) -> usize {
        if num_sites == 0 {
            return position;
        }
        let n = num_sites;
        match (direction, topology) {
            (Direction::Right, Topology::Periodic) => (position + 1) % n,
            (Direction::Right, Topology::Open) => {
                if position + 2 >= n {
                    0
                } else {
                    position + 1
                }
            }
            (Direction::Left, Topology::Periodic) => (position + n - 1) % n,
            (Direction::Left, Topology::Open) => {
                if position <= 1 {
                    n - 1
                } else {
                    position - 1
                }
            }
        }
    }

    /// Resolve to the current bond and move one step.
    ///
    /// The pointer only moves when resolution succeeds.
    pub fn resolve(&mut self, num_sites: usize, topology: Topology) -> Result<Vec<usize>> {
        let bond = Self::bond_at(self.direction, self.position, num_sites, topology)?;
        self.position = Self::advance(self.direction, self.position, num_sites, topology);
        Ok(bond)
    }
}

/// Placement rule of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// A single fixed site.
    Site { site: usize },
    /// The bond starting at `first`; the second site is `first + 1`, wrapping
    /// to 0 on a ring.
    Pair { first: usize },
    Pattern(Pattern),
    Staircase(Staircase),
}

impl Geometry {
    pub fn site(site: usize) -> Self {
        Geometry::Site { site }
    }

    pub fn pair(first: usize) -> Self {
        Geometry::Pair { first }
    }

    pub fn all_sites() -> Self {
        Geometry::Pattern(Pattern::AllSites)
    }

    pub fn all_bonds() -> Self {
        Geometry::Pattern(Pattern::AllBonds)
    }

    pub fn brickwork(parity: usize) -> Self {
        Geometry::Pattern(Pattern::Brickwork { parity })
    }

    pub fn alternating_brickwork(offset: usize) -> Self {
        Geometry::Pattern(Pattern::AlternatingBrickwork { offset })
    }

    pub fn staircase_right(start: usize) -> Self {
        Geometry::Staircase(Staircase::right(start))
    }

    pub fn staircase_left(start: usize) -> Self {
        Geometry::Staircase(Staircase::left(start))
    }

    /// Whether resolving this geometry mutates it.
    pub fn is_stateful(&self) -> bool {
        matches!(self, Geometry::Staircase(_))
    }

    /// Check the geometry can be resolved on a chain of `num_sites` sites.
    ///
    /// Patterns must yield at least one site group on every step.
    pub fn validate(&self, num_sites: usize, topology: Topology) -> Result<()> {
        match self {
            Geometry::Site { site } => check_site(*site, num_sites),
            Geometry::Pair { first } => pair_sites(*first, num_sites, topology).map(|_| ()),
            Geometry::Pattern(pattern) => {
                // steps 1 and 2 cover both layer parities
                for step in 1..=2 {
                    if pattern.expand(step, num_sites, topology)?.is_empty() {
                        return Err(Error::TooFewSites {
                            required: num_sites + 1,
                            num_sites,
                        });
                    }
                }
                Ok(())
            }
            Geometry::Staircase(s) => {
                Staircase::bond_at(s.direction, s.position, num_sites, topology).map(|_| ())
            }
        }
    }

    /// Resolve into site groups for the given (1-based) step.
    ///
    /// Groups must be applied in the returned order. Resolving a
    /// [`Geometry::Staircase`] moves its pointer, so only resolve once a gate
    /// is actually going to be applied.
    pub fn resolve(&mut self, step: usize, num_sites: usize, topology: Topology) -> Result<Vec<Vec<usize>>> {
        match self {
            Geometry::Site { site } => {
                check_site(*site, num_sites)?;
                Ok(vec![vec![*site]])
            }
            Geometry::Pair { first } => Ok(vec![pair_sites(*first, num_sites, topology)?]),
            Geometry::Pattern(pattern) => pattern.expand(step, num_sites, topology),
            Geometry::Staircase(s) => Ok(vec![s.resolve(num_sites, topology)?]),
        }
    }
}

fn pair_sites(first: usize, num_sites: usize, topology: Topology) -> Result<Vec<usize>> {
    require_sites(2, num_sites)?;
    check_site(first, num_sites)?;
    let second = match topology {
        Topology::Periodic => (first + 1) % num_sites,
        Topology::Open => first + 1,
    };
    check_site(second, num_sites)?;
    Ok(vec![first, second])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_chain() {
        assert_eq!(pair_chain(4), vec![(0, 1), (1, 2), (2, 3)]);
        assert!(pair_chain(1).is_empty());
    }

    #[test]
    fn test_pair_ring() {
        assert_eq!(pair_ring(4), vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    }

    #[test]
    fn test_advance_right_open_cycle() {
        let mut p = 0;
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(p);
            p = Staircase::advance(Direction::Right, p, 4, Topology::Open);
        }
        assert_eq!(seen, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_advance_left_open_cycle() {
        let mut p = 3;
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(p);
            p = Staircase::advance(Direction::Left, p, 4, Topology::Open);
        }
        assert_eq!(seen, vec![3, 2, 1, 3, 2, 1]);
    }

    #[test]
    fn test_brick_layer_odd_ring() {
        // 5-site ring: the odd layer cannot close over the boundary
        let layer = brick_layer(1, 5, Topology::Periodic).unwrap();
        assert_eq!(layer, vec![vec![1, 2], vec![3, 4]]);
    }
}
