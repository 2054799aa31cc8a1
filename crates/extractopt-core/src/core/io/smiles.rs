//! Reader for SMILES (Simplified Molecular Input Line Entry System) strings.
//!
//! Supports the organic subset, bracket atoms (isotope, chirality, hydrogen count,
//! charge and atom class), explicit bonds, branches, ring closures (`0`-`9` and
//! `%nn`) and dot-disconnected components. Implicit hydrogens are assigned from the
//! default valences of the organic subset once the whole graph is known.

use crate::core::models::element::Element;
use crate::core::models::molecule::{Atom, BondOrder, Chirality, GraphError, Molecule};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq)]
pub enum SmilesError {
    #[error("SMILES string is empty")]
    Empty,
    #[error("Parse error at position {position}: {kind}")]
    Parse {
        position: usize,
        kind: SmilesParseErrorKind,
    },
    #[error("Branch opened at position {0} is never closed")]
    UnclosedBranch(usize),
    #[error("Ring bond {0} is never closed")]
    UnclosedRing(u16),
    #[error("Atom {atom} ({element}) has valence {valence}, above its maximum of {max}")]
    ValenceExceeded {
        atom: usize,
        element: &'static str,
        valence: u32,
        max: u8,
    },
    #[error("Atom {atom} ({element}) is marked aromatic but is not part of a ring")]
    NonRingAromatic { atom: usize, element: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum SmilesParseErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("element '{0}' cannot be aromatic")]
    InvalidAromatic(String),
    #[error("bracket atom is not terminated by ']'")]
    UnterminatedBracket,
    #[error("number is out of range")]
    NumberOutOfRange,
    #[error("branch must follow an atom")]
    BranchWithoutAtom,
    #[error("')' has no matching '('")]
    UnmatchedBranchClose,
    #[error("bond symbol must follow an atom")]
    BondWithoutAtom,
    #[error("bond symbol is not followed by an atom")]
    DanglingBond,
    #[error("ring bond must follow an atom")]
    RingBondWithoutAtom,
    #[error("'%' must be followed by a two-digit ring label")]
    InvalidRingLabel,
    #[error("ring bond {0} is given two different bond orders")]
    ConflictingRingBond(u16),
    #[error("ring bond {label} is invalid: {source}")]
    InvalidRingBond { label: u16, source: GraphError },
}

/// Parses a SMILES string into a hydrogen-suppressed molecular graph.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let mut parser = Parser::new(smiles);
    parser.run()?;
    let mol = parser.finish()?;
    trace!(smiles, atoms = mol.atom_count(), "Parsed SMILES.");
    Ok(mol)
}

#[derive(Debug)]
struct RingOpening {
    atom: usize,
    bond: Option<BondOrder>,
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    mol: Molecule,
    prev: Option<usize>,
    pending_bond: Option<(BondOrder, usize)>,
    branches: Vec<(usize, usize)>,
    rings: BTreeMap<u16, RingOpening>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            pending_bond: None,
            branches: Vec::new(),
            rings: BTreeMap::new(),
        }
    }

    fn error(&self, position: usize, kind: SmilesParseErrorKind) -> SmilesError {
        SmilesError::Parse { position, kind }
    }

    fn unexpected(&self, position: usize) -> SmilesError {
        let ch = self.src[position..].chars().next().unwrap_or('\0');
        self.error(position, SmilesParseErrorKind::UnexpectedCharacter(ch))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                b'(' => {
                    let Some(prev) = self.prev else {
                        return Err(self.error(start, SmilesParseErrorKind::BranchWithoutAtom));
                    };
                    if let Some((_, at)) = self.pending_bond {
                        return Err(self.error(at, SmilesParseErrorKind::DanglingBond));
                    }
                    self.branches.push((prev, start));
                    self.pos += 1;
                }
                b')' => {
                    if let Some((_, at)) = self.pending_bond {
                        return Err(self.error(at, SmilesParseErrorKind::DanglingBond));
                    }
                    let Some((atom, _)) = self.branches.pop() else {
                        return Err(self.error(start, SmilesParseErrorKind::UnmatchedBranchClose));
                    };
                    self.prev = Some(atom);
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    if self.prev.is_none() {
                        return Err(self.error(start, SmilesParseErrorKind::BondWithoutAtom));
                    }
                    if self.pending_bond.is_some() {
                        return Err(self.unexpected(start));
                    }
                    let order = match c {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending_bond = Some((order, start));
                    self.pos += 1;
                }
                b'.' => {
                    if let Some((_, at)) = self.pending_bond {
                        return Err(self.error(at, SmilesParseErrorKind::DanglingBond));
                    }
                    if self.prev.is_none() {
                        return Err(self.unexpected(start));
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                b'0'..=b'9' | b'%' => self.ring_bond()?,
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom)?;
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.attach(atom)?;
                }
            }
        }
        Ok(())
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.mol.atom(a).aromatic && self.mol.atom(b).aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn attach(&mut self, atom: Atom) -> Result<(), SmilesError> {
        let idx = self.mol.add_atom(atom);
        if let Some(prev) = self.prev {
            let order = match self.pending_bond.take() {
                Some((order, _)) => order,
                None => self.default_order(prev, idx),
            };
            // A freshly added atom cannot already be bonded to `prev`.
            self.mol
                .add_bond(prev, idx, order)
                .map_err(|_| self.unexpected(self.pos.saturating_sub(1)))?;
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn ring_bond(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let label = match self.peek() {
            Some(b'%') => {
                let digits = (self.peek_at(1), self.peek_at(2));
                match digits {
                    (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
                        self.pos += 3;
                        ((d1 - b'0') * 10 + (d2 - b'0')) as u16
                    }
                    _ => return Err(self.error(start, SmilesParseErrorKind::InvalidRingLabel)),
                }
            }
            Some(d) => {
                self.pos += 1;
                (d - b'0') as u16
            }
            None => return Err(self.error(start, SmilesParseErrorKind::InvalidRingLabel)),
        };

        let Some(current) = self.prev else {
            return Err(self.error(start, SmilesParseErrorKind::RingBondWithoutAtom));
        };
        let written = self.pending_bond.take().map(|(order, _)| order);

        match self.rings.remove(&label) {
            Some(opening) => {
                let order = match (opening.bond, written) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(
                            self.error(start, SmilesParseErrorKind::ConflictingRingBond(label))
                        );
                    }
                    (Some(order), _) | (None, Some(order)) => order,
                    (None, None) => self.default_order(opening.atom, current),
                };
                self.mol
                    .add_bond(opening.atom, current, order)
                    .map_err(|source| {
                        self.error(start, SmilesParseErrorKind::InvalidRingBond { label, source })
                    })?;
            }
            None => {
                self.rings.insert(
                    label,
                    RingOpening {
                        atom: current,
                        bond: written,
                    },
                );
            }
        }
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Err(self.unexpected(start));
        };
        let (symbol, aromatic, len) = match (c, self.peek_at(1)) {
            (b'B', Some(b'r')) => ("Br", false, 2),
            (b'C', Some(b'l')) => ("Cl", false, 2),
            (b'F', _) => ("F", false, 1),
            (b'I', _) => ("I", false, 1),
            _ => match (aromatic_symbol(c.to_ascii_lowercase()), c.is_ascii_lowercase()) {
                (Some(symbol), aromatic) => (symbol, aromatic, 1),
                (None, _) => return Err(self.unexpected(start)),
            },
        };
        let element = Element::from_symbol(symbol).ok_or_else(|| {
            self.error(
                start,
                SmilesParseErrorKind::UnknownElement(symbol.to_string()),
            )
        })?;
        self.pos += len;

        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        Ok(atom)
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let open = self.pos;
        self.pos += 1;

        let isotope = match self.read_number(open)? {
            Some(n) => Some(u16::try_from(n).map_err(|_| {
                self.error(open + 1, SmilesParseErrorKind::NumberOutOfRange)
            })?),
            None => None,
        };

        let (element, aromatic) = self.bracket_element(open)?;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        atom.isotope = isotope;

        if self.peek() == Some(b'@') {
            self.pos += 1;
            atom.chirality = if self.peek() == Some(b'@') {
                self.pos += 1;
                Chirality::Clockwise
            } else {
                Chirality::CounterClockwise
            };
        }

        if self.peek() == Some(b'H') {
            self.pos += 1;
            let count = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.pos += 1;
                    d - b'0'
                }
                _ => 1,
            };
            atom.bracket_hydrogens = Some(count);
        } else {
            atom.bracket_hydrogens = Some(0);
        }

        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            let charge_start = self.pos;
            self.pos += 1;
            let mut magnitude: u32 = 1;
            if let Some(n) = self.read_number(open)? {
                magnitude = n;
            } else {
                while self.peek() == Some(sign) {
                    self.pos += 1;
                    magnitude += 1;
                }
            }
            let magnitude = i8::try_from(magnitude)
                .map_err(|_| self.error(charge_start, SmilesParseErrorKind::NumberOutOfRange))?;
            atom.formal_charge = if sign == b'+' { magnitude } else { -magnitude };
        }

        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.read_number(open)?.is_none() {
                return Err(match self.peek() {
                    Some(_) => self.unexpected(self.pos),
                    None => self.error(open, SmilesParseErrorKind::UnterminatedBracket),
                });
            }
        }

        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(atom)
            }
            Some(_) => Err(self.unexpected(self.pos)),
            None => Err(self.error(open, SmilesParseErrorKind::UnterminatedBracket)),
        }
    }

    fn bracket_element(&mut self, open: usize) -> Result<(&'static Element, bool), SmilesError> {
        let start = self.pos;
        let Some(first) = self.peek() else {
            return Err(self.error(open, SmilesParseErrorKind::UnterminatedBracket));
        };

        if first.is_ascii_uppercase() {
            if let Some(second) = self.peek_at(1).filter(u8::is_ascii_lowercase) {
                let two = [first, second];
                let symbol = std::str::from_utf8(&two).unwrap_or("");
                if let Some(element) = Element::from_symbol(symbol) {
                    self.pos += 2;
                    return Ok((element, false));
                }
            }
            let symbol = &self.src[start..start + 1];
            let element = Element::from_symbol(symbol).ok_or_else(|| {
                self.error(
                    start,
                    SmilesParseErrorKind::UnknownElement(symbol.to_string()),
                )
            })?;
            self.pos += 1;
            return Ok((element, false));
        }

        if first.is_ascii_lowercase() {
            let symbol = match (first, self.peek_at(1)) {
                (b's', Some(b'e')) => Some(("Se", 2)),
                (b'a', Some(b's')) => Some(("As", 2)),
                _ => aromatic_symbol(first).map(|s| (s, 1)),
            };
            let Some((symbol, len)) = symbol else {
                return Err(self.unexpected(start));
            };
            let element = Element::from_symbol(symbol).ok_or_else(|| {
                self.error(
                    start,
                    SmilesParseErrorKind::UnknownElement(symbol.to_string()),
                )
            })?;
            if !element.can_be_aromatic() {
                return Err(self.error(
                    start,
                    SmilesParseErrorKind::InvalidAromatic(symbol.to_string()),
                ));
            }
            self.pos += len;
            return Ok((element, true));
        }

        Err(self.unexpected(start))
    }

    fn read_number(&mut self, anchor: usize) -> Result<Option<u32>, SmilesError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        self.src[start..self.pos]
            .parse::<u32>()
            .map(Some)
            .map_err(|_| self.error(anchor, SmilesParseErrorKind::NumberOutOfRange))
    }

    fn finish(mut self) -> Result<Molecule, SmilesError> {
        if let Some((_, at)) = self.pending_bond {
            return Err(self.error(at, SmilesParseErrorKind::DanglingBond));
        }
        if let Some(&(_, at)) = self.branches.first() {
            return Err(SmilesError::UnclosedBranch(at));
        }
        if let Some(&label) = self.rings.keys().next() {
            return Err(SmilesError::UnclosedRing(label));
        }
        if self.mol.is_empty() {
            return Err(SmilesError::Empty);
        }

        assign_hydrogens(&mut self.mol)?;

        let ring_atoms = self.mol.ring_atoms();
        for (idx, atom) in self.mol.atoms().iter().enumerate() {
            if atom.aromatic && !ring_atoms[idx] {
                return Err(SmilesError::NonRingAromatic {
                    atom: idx,
                    element: atom.element.symbol,
                });
            }
        }
        Ok(self.mol)
    }
}

fn aromatic_symbol(c: u8) -> Option<&'static str> {
    match c {
        b'b' => Some("B"),
        b'c' => Some("C"),
        b'n' => Some("N"),
        b'o' => Some("O"),
        b'p' => Some("P"),
        b's' => Some("S"),
        _ => None,
    }
}

/// Assigns implicit hydrogens to organic-subset atoms from their default valences.
///
/// Aromatic bonds contribute one sigma bond each. Aromatic atoms that can form a
/// double bond (B, C, N, P) reserve one further unit of valence for the pi system;
/// aromatic O and S donate a lone pair instead.
fn assign_hydrogens(mol: &mut Molecule) -> Result<(), SmilesError> {
    for idx in 0..mol.atom_count() {
        let atom = mol.atom(idx);
        if let Some(h) = atom.bracket_hydrogens {
            mol.atom_mut(idx).hydrogen_count = h;
            continue;
        }

        let element = atom.element;
        let sigma_valence: u32 = mol
            .neighbors(idx)
            .map(|(_, bond)| match bond.order {
                BondOrder::Aromatic => 1,
                other => (other.valence_halves() / 2) as u32,
            })
            .sum();

        let max = element.max_valence().unwrap_or(0);
        let Some(target) = element
            .default_valences
            .iter()
            .map(|&v| v as u32)
            .find(|&v| v >= sigma_valence)
        else {
            return Err(SmilesError::ValenceExceeded {
                atom: idx,
                element: element.symbol,
                valence: sigma_valence,
                max,
            });
        };

        let pi_reserve = u32::from(atom.aromatic && matches!(element.symbol, "B" | "C" | "N" | "P"));
        let hydrogens = target.saturating_sub(sigma_valence + pi_reserve);
        mol.atom_mut(idx).hydrogen_count = hydrogens as u8;
    }
    Ok(())
}
