use super::element::Element;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution of this bond, in half-units (aromatic bonds count 1.5).
    pub fn valence_halves(self) -> u8 {
        match self {
            Self::Single => 2,
            Self::Double => 4,
            Self::Triple => 6,
            Self::Aromatic => 3,
        }
    }

    pub fn is_multiple(self) -> bool {
        matches!(self, Self::Double | Self::Triple)
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// Tetrahedral chirality marker as written in the input. It is carried through
/// parsing but does not influence any descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chirality {
    #[default]
    Unspecified,
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: &'static Element,
    pub aromatic: bool,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub chirality: Chirality,
    /// Hydrogens written explicitly inside a bracket atom (`[NH2+]`).
    /// `None` means the count is derived from the default valence model.
    pub bracket_hydrogens: Option<u8>,
    /// Hydrogens attached to this atom after valence perception.
    pub hydrogen_count: u8,
}

impl Atom {
    pub fn new(element: &'static Element) -> Self {
        Self {
            element,
            aromatic: false,
            formal_charge: 0,
            isotope: None,
            chirality: Chirality::Unspecified,
            bracket_hydrogens: None,
            hydrogen_count: 0,
        }
    }

    pub fn is(&self, symbol: &str) -> bool {
        self.element.symbol == symbol
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn other(&self, atom: usize) -> usize {
        if self.atom1 == atom {
            self.atom2
        } else {
            self.atom1
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Atom index {0} is out of range")]
    AtomOutOfRange(usize),
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
}

/// A hydrogen-suppressed molecular graph.
///
/// Heavy atoms (and any hydrogen written as a bracket atom) are nodes; all other
/// hydrogens are stored as counts on their parent atom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    pub fn add_bond(&mut self, a: usize, b: usize, order: BondOrder) -> Result<usize, GraphError> {
        for idx in [a, b] {
            if idx >= self.atoms.len() {
                return Err(GraphError::AtomOutOfRange(idx));
            }
        }
        if a == b {
            return Err(GraphError::SelfBond(a));
        }
        if self.bond_between(a, b).is_some() {
            return Err(GraphError::DuplicateBond(a.min(b), a.max(b)));
        }
        let bond_idx = self.bonds.len();
        self.bonds.push(Bond {
            atom1: a,
            atom2: b,
            order,
        });
        self.adjacency[a].push((b, bond_idx));
        self.adjacency[b].push((a, bond_idx));
        Ok(bond_idx)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    pub(crate) fn atom_mut(&mut self, idx: usize) -> &mut Atom {
        &mut self.atoms[idx]
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bi)| &self.bonds[bi])
    }

    /// Neighbor atom indices paired with the connecting bond.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = (usize, &Bond)> + '_ {
        self.adjacency[idx]
            .iter()
            .map(move |&(n, bi)| (n, &self.bonds[bi]))
    }

    /// Number of explicit graph neighbors (hydrogen counts excluded).
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// Sum of bond valence contributions in half-units.
    pub fn bond_valence_halves(&self, idx: usize) -> u32 {
        self.neighbors(idx)
            .map(|(_, b)| b.order.valence_halves() as u32)
            .sum()
    }

    pub fn has_multiple_bond(&self, idx: usize) -> bool {
        self.neighbors(idx).any(|(_, b)| b.order.is_multiple())
    }

    pub fn total_hydrogens(&self) -> u32 {
        self.atoms
            .iter()
            .map(|a| {
                if a.element.is_hydrogen() {
                    1 + a.hydrogen_count as u32
                } else {
                    a.hydrogen_count as u32
                }
            })
            .sum()
    }

    /// Flags every bond that lies on a cycle.
    ///
    /// A bond is a ring bond exactly when it is not a bridge of the graph,
    /// which is determined with a single low-link depth-first traversal.
    pub fn ring_bonds(&self) -> Vec<bool> {
        let n = self.atoms.len();
        let mut in_ring = vec![true; self.bonds.len()];
        let mut discovery = vec![usize::MAX; n];
        let mut low = vec![0usize; n];
        let mut timer = 0usize;

        for root in 0..n {
            if discovery[root] != usize::MAX {
                continue;
            }
            // (atom, bond used to reach it, next adjacency slot)
            let mut stack: Vec<(usize, Option<usize>, usize)> = vec![(root, None, 0)];
            discovery[root] = timer;
            low[root] = timer;
            timer += 1;

            while let Some(&(atom, parent_bond, slot)) = stack.last() {
                if let Some(&(next, bond_idx)) = self.adjacency[atom].get(slot) {
                    if let Some(top) = stack.last_mut() {
                        top.2 += 1;
                    }
                    if Some(bond_idx) == parent_bond {
                        continue;
                    }
                    if discovery[next] == usize::MAX {
                        discovery[next] = timer;
                        low[next] = timer;
                        timer += 1;
                        stack.push((next, Some(bond_idx), 0));
                    } else {
                        low[atom] = low[atom].min(discovery[next]);
                    }
                } else {
                    stack.pop();
                    if let (Some(bond_idx), Some(&(parent, _, _))) = (parent_bond, stack.last()) {
                        low[parent] = low[parent].min(low[atom]);
                        if low[atom] > discovery[parent] {
                            in_ring[bond_idx] = false;
                        }
                    }
                }
            }
        }
        in_ring
    }

    /// Flags every atom that belongs to at least one ring bond.
    pub fn ring_atoms(&self) -> Vec<bool> {
        let mut member = vec![false; self.atoms.len()];
        for (bond, in_ring) in self.bonds.iter().zip(self.ring_bonds()) {
            if in_ring {
                member[bond.atom1] = true;
                member[bond.atom2] = true;
            }
        }
        member
    }

    /// Molecular formula in Hill order (C, then H, then the rest alphabetically).
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.symbol).or_default() += 1;
            if atom.hydrogen_count > 0 {
                *counts.entry("H").or_default() += atom.hydrogen_count as u32;
            }
        }

        let mut out = String::new();
        let mut push = |symbol: &str, count: u32| {
            out.push_str(symbol);
            if count > 1 {
                out.push_str(&count.to_string());
            }
        };
        let has_carbon = counts.contains_key("C");
        if has_carbon {
            if let Some(c) = counts.remove("C") {
                push("C", c);
            }
            if let Some(h) = counts.remove("H") {
                push("H", h);
            }
        }
        for (symbol, count) in counts {
            push(symbol, count);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Atom {
        Atom::new(Element::from_symbol("C").unwrap())
    }

    fn chain(n: usize) -> Molecule {
        let mut mol = Molecule::new();
        for i in 0..n {
            let idx = mol.add_atom(carbon());
            if i > 0 {
                mol.add_bond(idx - 1, idx, BondOrder::Single).unwrap();
            }
        }
        mol
    }

    #[test]
    fn add_bond_rejects_self_and_duplicate_bonds() {
        let mut mol = chain(2);
        assert_eq!(
            mol.add_bond(0, 0, BondOrder::Single),
            Err(GraphError::SelfBond(0))
        );
        assert_eq!(
            mol.add_bond(1, 0, BondOrder::Double),
            Err(GraphError::DuplicateBond(0, 1))
        );
        assert_eq!(
            mol.add_bond(0, 5, BondOrder::Single),
            Err(GraphError::AtomOutOfRange(5))
        );
    }

    #[test]
    fn acyclic_chain_has_no_ring_bonds() {
        let mol = chain(5);
        assert!(mol.ring_bonds().iter().all(|&r| !r));
        assert!(mol.ring_atoms().iter().all(|&r| !r));
    }

    #[test]
    fn closing_a_ring_marks_only_cycle_members() {
        // Cyclopentane with a methyl tail on atom 0.
        let mut mol = chain(5);
        mol.add_bond(4, 0, BondOrder::Single).unwrap();
        let tail = mol.add_atom(carbon());
        mol.add_bond(0, tail, BondOrder::Single).unwrap();

        let ring_atoms = mol.ring_atoms();
        assert!(ring_atoms[..5].iter().all(|&r| r));
        assert!(!ring_atoms[tail]);

        let ring_bonds = mol.ring_bonds();
        assert_eq!(ring_bonds.iter().filter(|&&r| r).count(), 5);
    }

    #[test]
    fn bond_valence_counts_aromatic_as_one_and_a_half() {
        let mut mol = chain(3);
        mol.add_bond(0, 2, BondOrder::Aromatic).unwrap();
        assert_eq!(mol.bond_valence_halves(0), 2 + 3);
        assert_eq!(mol.bond_valence_halves(1), 4);
    }

    #[test]
    fn formula_uses_hill_order() {
        let mut mol = chain(2);
        mol.atom_mut(0).hydrogen_count = 3;
        mol.atom_mut(1).hydrogen_count = 2;
        let o = mol.add_atom(Atom::new(Element::from_symbol("O").unwrap()));
        mol.atom_mut(o).hydrogen_count = 1;
        mol.add_bond(1, o, BondOrder::Single).unwrap();
        assert_eq!(mol.formula(), "C2H6O");
        assert_eq!(mol.total_hydrogens(), 6);
    }
}
