//! Physicochemical descriptors derived from a molecular graph.
//!
//! | Descriptor        | Method                                              |
//! |-------------------|-----------------------------------------------------|
//! | `MolecularWeight` | Sum of standard atomic weights, hydrogens included  |
//! | `LogP`            | Atom-typed Wildman-Crippen contributions            |
//! | `Polarizability`  | Labute approximate surface area (bond radii)        |
//! | `NumHDonors`      | N-H, neutral O-H / S-H, aromatic n-H                |
//! | `NumHAcceptors`   | Lipinski-style O, S, N and F acceptor typing        |

use crate::core::io::smiles;
use crate::core::models::element::Element;
use crate::core::models::molecule::{BondOrder, Molecule};
use serde::Serialize;
use std::collections::HashSet;
use std::f64::consts::PI;
use tracing::debug;

/// The five descriptors consumed by the yield predictor, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescriptorSet {
    pub molecular_weight: f64,
    #[serde(rename = "LogP")]
    pub log_p: f64,
    pub polarizability: f64,
    #[serde(rename = "NumHDonors")]
    pub h_bond_donors: u32,
    #[serde(rename = "NumHAcceptors")]
    pub h_bond_acceptors: u32,
}

impl DescriptorSet {
    pub const NAMES: [&'static str; 5] = [
        "MolecularWeight",
        "LogP",
        "Polarizability",
        "NumHDonors",
        "NumHAcceptors",
    ];

    /// Values in the order of [`DescriptorSet::NAMES`].
    pub fn values(&self) -> [f64; 5] {
        [
            self.molecular_weight,
            self.log_p,
            self.polarizability,
            self.h_bond_donors as f64,
            self.h_bond_acceptors as f64,
        ]
    }

    pub fn compute(mol: &Molecule) -> Self {
        Self {
            molecular_weight: molecular_weight(mol),
            log_p: crippen_log_p(mol),
            polarizability: labute_asa(mol),
            h_bond_donors: h_bond_donors(mol),
            h_bond_acceptors: h_bond_acceptors(mol),
        }
    }
}

/// Computes descriptors for a SMILES string.
///
/// Returns `None` when the string does not describe a valid molecular graph;
/// callers are expected to filter such entries rather than fail.
pub fn from_smiles(smiles: &str) -> Option<DescriptorSet> {
    match smiles::parse(smiles) {
        Ok(mol) => Some(DescriptorSet::compute(&mol)),
        Err(e) => {
            debug!(smiles, error = %e, "No descriptors: structure did not parse.");
            None
        }
    }
}

pub fn molecular_weight(mol: &Molecule) -> f64 {
    let h_mass = Element::hydrogen().average_mass;
    mol.atoms()
        .iter()
        .map(|a| a.element.average_mass + a.hydrogen_count as f64 * h_mass)
        .sum()
}

/// Simplified Wildman-Crippen octanol/water partition coefficient.
pub fn crippen_log_p(mol: &Molecule) -> f64 {
    (0..mol.atom_count())
        .map(|idx| heavy_atom_log_p(mol, idx) + hydrogen_log_p(mol, idx))
        .sum()
}

fn is_heteroatom(element: &Element) -> bool {
    !element.is_carbon() && !element.is_hydrogen()
}

fn heavy_atom_log_p(mol: &Molecule, idx: usize) -> f64 {
    let atom = mol.atom(idx);
    let heavy_degree = mol
        .neighbors(idx)
        .filter(|&(n, _)| !mol.atom(n).element.is_hydrogen())
        .count();
    let hetero_neighbor = mol
        .neighbors(idx)
        .any(|(n, _)| is_heteroatom(mol.atom(n).element));
    let aromatic_neighbor = mol.neighbors(idx).any(|(n, _)| mol.atom(n).aromatic);
    let double_to_hetero = mol.neighbors(idx).any(|(n, b)| {
        b.order == BondOrder::Double && is_heteroatom(mol.atom(n).element)
    });
    let has_double = mol
        .neighbors(idx)
        .any(|(_, b)| b.order == BondOrder::Double);
    let has_triple = mol
        .neighbors(idx)
        .any(|(_, b)| b.order == BondOrder::Triple);

    match atom.element.symbol {
        "C" => {
            if atom.aromatic {
                let aromatic_bonds = mol
                    .neighbors(idx)
                    .filter(|(_, b)| b.order == BondOrder::Aromatic)
                    .count();
                if hetero_neighbor {
                    0.1360
                } else if aromatic_bonds >= 3 {
                    0.2955
                } else {
                    0.1581
                }
            } else if has_triple {
                0.0017
            } else if double_to_hetero {
                -0.2783
            } else if has_double {
                0.1551
            } else if hetero_neighbor {
                if heavy_degree <= 2 { -0.2035 } else { -0.2051 }
            } else if heavy_degree <= 2 {
                0.1441
            } else {
                0.0
            }
        }
        "N" => {
            if atom.formal_charge > 0 {
                -0.3239
            } else if atom.aromatic {
                -0.4806
            } else if has_triple {
                -0.5188
            } else if has_double {
                -0.0489
            } else {
                match atom.hydrogen_count {
                    2.. => -1.0190,
                    1 => -0.7096,
                    0 => -0.3187,
                }
            }
        }
        "O" => {
            if atom.formal_charge < 0 {
                -1.3260
            } else if atom.aromatic {
                0.1552
            } else if has_double {
                -0.1526
            } else if heavy_degree >= 2 {
                if aromatic_neighbor { -0.4195 } else { -0.0684 }
            } else {
                -0.2893
            }
        }
        "S" => {
            if atom.aromatic {
                0.6237
            } else if atom.formal_charge != 0 {
                -0.5188
            } else {
                0.6482
            }
        }
        "F" => 0.4202,
        "Cl" => 0.6895,
        "Br" => 0.8456,
        "I" => 0.8857,
        "P" => 0.8612,
        "H" => 0.1230,
        _ => 0.0,
    }
}

fn hydrogen_log_p(mol: &Molecule, idx: usize) -> f64 {
    let atom = mol.atom(idx);
    let per_h = match atom.element.symbol {
        "C" => 0.1230,
        "O" => -0.2677,
        "N" => 0.2142,
        _ => 0.1230,
    };
    atom.hydrogen_count as f64 * per_h
}

/// Labute approximate surface area, hydrogens included.
///
/// Atoms are spheres of their bond radius placed at ideal bond lengths (sum of
/// bond radii, shortened by 0.1, 0.2 and 0.3 Angstrom for aromatic, double and
/// triple bonds). Each neighbor subtracts the cap term
/// `Rj^2 - (Ri - dij)^2 / dij` from the atom's `4 Ri` before scaling by `pi Ri`.
/// All implicit hydrogens share a single sphere term.
pub fn labute_asa(mol: &Molecule) -> f64 {
    let radii: Vec<f64> = mol.atoms().iter().map(|a| a.element.bond_radius).collect();
    let mut buried = vec![0.0; mol.atom_count()];

    for bond in mol.bonds() {
        let (ri, rj) = (radii[bond.atom1], radii[bond.atom2]);
        let shortening = match bond.order {
            BondOrder::Single => 0.0,
            BondOrder::Aromatic => 0.1,
            BondOrder::Double => 0.2,
            BondOrder::Triple => 0.3,
        };
        let dij = cap_distance(ri, rj, ri + rj - shortening);
        buried[bond.atom1] += cap_term(ri, rj, dij);
        buried[bond.atom2] += cap_term(rj, ri, dij);
    }

    let rh = Element::hydrogen().bond_radius;
    let mut hydrogen_buried = 0.0;
    for (idx, atom) in mol.atoms().iter().enumerate() {
        if atom.hydrogen_count == 0 {
            continue;
        }
        let ri = radii[idx];
        let dij = cap_distance(ri, rh, ri + rh);
        let n_h = atom.hydrogen_count as f64;
        buried[idx] += n_h * cap_term(ri, rh, dij);
        hydrogen_buried += n_h * cap_term(rh, ri, dij);
    }

    let heavy_area: f64 = radii
        .iter()
        .zip(&buried)
        .map(|(&r, &b)| PI * r * (4.0 * r - b))
        .sum();
    if mol.atoms().iter().any(|a| a.hydrogen_count > 0) {
        heavy_area + PI * rh * (4.0 * rh - hydrogen_buried)
    } else {
        heavy_area
    }
}

fn cap_distance(ri: f64, rj: f64, bond_length: f64) -> f64 {
    bond_length.max((ri - rj).abs()).min(ri + rj)
}

fn cap_term(ri: f64, rj: f64, dij: f64) -> f64 {
    rj * rj - (ri - dij).powi(2) / dij
}

pub fn h_bond_donors(mol: &Molecule) -> u32 {
    mol.atoms()
        .iter()
        .filter(|a| match a.element.symbol {
            "N" => a.hydrogen_count > 0,
            "O" | "S" => a.formal_charge == 0 && a.hydrogen_count == 1,
            _ => false,
        })
        .count() as u32
}

/// Lipinski-style acceptor count. Neutral O and S must be divalent, so
/// sulfoxide and sulfone sulfur is not counted. A trivalent N is excluded when
/// it is singly bonded to an atom carrying an acyclic double bond to a
/// heteroatom (amides, sulfonamides and the like).
pub fn h_bond_acceptors(mol: &Molecule) -> u32 {
    let ring_pairs: HashSet<(usize, usize)> = mol
        .bonds()
        .iter()
        .zip(mol.ring_bonds())
        .filter(|&(_, in_ring)| in_ring)
        .map(|(b, _)| (b.atom1.min(b.atom2), b.atom1.max(b.atom2)))
        .collect();
    let double_to_hetero = |idx: usize, acyclic_only: bool| {
        mol.neighbors(idx).any(|(n, b)| {
            b.order == BondOrder::Double
                && matches!(mol.atom(n).element.symbol, "O" | "N" | "P" | "S")
                && !(acyclic_only && ring_pairs.contains(&(idx.min(n), idx.max(n))))
        })
    };

    (0..mol.atom_count())
        .filter(|&idx| {
            let atom = mol.atom(idx);
            match atom.element.symbol {
                "O" | "S" => {
                    if atom.aromatic {
                        return atom.formal_charge == 0;
                    }
                    if atom.formal_charge < 0 {
                        return true;
                    }
                    if atom.formal_charge != 0 {
                        return false;
                    }
                    let divalent =
                        mol.bond_valence_halves(idx) + 2 * atom.hydrogen_count as u32 == 4;
                    match atom.hydrogen_count {
                        0 => divalent,
                        1 => {
                            divalent
                                && !mol.neighbors(idx).any(|(n, _)| double_to_hetero(n, false))
                        }
                        _ => false,
                    }
                }
                "N" => {
                    if atom.formal_charge != 0 {
                        return false;
                    }
                    if atom.aromatic {
                        return atom.hydrogen_count == 0;
                    }
                    let trivalent = mol.bond_valence_halves(idx) / 2 + atom.hydrogen_count as u32 == 3;
                    let amide_like = mol.neighbors(idx).any(|(n, b)| {
                        b.order == BondOrder::Single
                            && !mol.atom(n).aromatic
                            && double_to_hetero(n, true)
                    });
                    trivalent && !amide_like
                }
                "F" => true,
                _ => false,
            }
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINALOOL: &str = "CC(C)=CCCC(C)(O)C=C";

    fn descriptors(smiles: &str) -> DescriptorSet {
        from_smiles(smiles).expect("valid SMILES")
    }

    #[test]
    fn linalool_molecular_weight_matches_reference() {
        let d = descriptors(LINALOOL);
        assert!(
            (d.molecular_weight - 154.249).abs() < 0.01,
            "MW = {}",
            d.molecular_weight
        );
        assert!(d.log_p.is_finite());
    }

    #[test]
    fn linalool_has_one_donor_and_one_acceptor() {
        let d = descriptors(LINALOOL);
        assert_eq!(d.h_bond_donors, 1);
        assert_eq!(d.h_bond_acceptors, 1);
    }

    #[test]
    fn linalool_log_p_is_in_the_terpene_alcohol_range() {
        let d = descriptors(LINALOOL);
        assert!(d.log_p > 2.0 && d.log_p < 3.5, "logP = {}", d.log_p);
    }

    #[test]
    fn invalid_smiles_gives_no_descriptors() {
        assert!(from_smiles("InvalidSMILES").is_none());
        assert!(from_smiles("").is_none());
        assert!(from_smiles("C1CC").is_none());
    }

    #[test]
    fn descriptors_are_deterministic() {
        assert_eq!(descriptors(LINALOOL), descriptors(LINALOOL));
    }

    #[test]
    fn hydrocarbons_have_no_donors_or_acceptors() {
        let limonene = descriptors("CC1=CC[C@@H](CC1)C(=C)C");
        assert_eq!(limonene.h_bond_donors, 0);
        assert_eq!(limonene.h_bond_acceptors, 0);
        assert!((limonene.molecular_weight - 136.238).abs() < 0.01);
    }

    #[test]
    fn hydrophobicity_orders_simple_molecules() {
        let ethanol = descriptors("CCO");
        let hexane = descriptors("CCCCCC");
        let water = descriptors("O");
        assert!(hexane.log_p > ethanol.log_p);
        assert!(ethanol.log_p > water.log_p);
    }

    #[test]
    fn labute_surface_area_matches_reference_values() {
        let linalool = descriptors(LINALOOL);
        assert!(
            (linalool.polarizability - 69.58).abs() < 0.05,
            "ASA = {}",
            linalool.polarizability
        );
        let ethanol = descriptors("CCO");
        assert!(
            (ethanol.polarizability - 19.40).abs() < 0.05,
            "ASA = {}",
            ethanol.polarizability
        );
    }

    #[test]
    fn surface_area_grows_with_size() {
        let methane = descriptors("C");
        let propane = descriptors("CCC");
        let hexane = descriptors("CCCCCC");
        assert!(methane.polarizability > 0.0);
        assert!(propane.polarizability > methane.polarizability);
        assert!(hexane.polarizability > propane.polarizability);
    }

    #[test]
    fn carboxylic_acid_hydroxyl_is_not_an_acceptor() {
        // Acetic acid: the carbonyl oxygen accepts; the acid OH is excluded.
        let d = descriptors("CC(=O)O");
        assert_eq!(d.h_bond_donors, 1);
        assert_eq!(d.h_bond_acceptors, 1);
    }

    #[test]
    fn amide_nitrogen_is_not_an_acceptor() {
        let d = descriptors("CC(=O)N");
        assert_eq!(d.h_bond_donors, 1);
        assert_eq!(d.h_bond_acceptors, 1);

        let amine = descriptors("CCN");
        assert_eq!(amine.h_bond_acceptors, 1);
    }

    #[test]
    fn hypervalent_sulfur_is_not_an_acceptor() {
        // Dimethyl sulfone: only the two sulfonyl oxygens accept.
        assert_eq!(descriptors("CS(C)(=O)=O").h_bond_acceptors, 2);
        // Dimethyl sulfoxide: the oxygen accepts, the sulfur does not.
        assert_eq!(descriptors("CS(C)=O").h_bond_acceptors, 1);
        // A thioether sulfur is divalent and counts.
        assert_eq!(descriptors("CSC").h_bond_acceptors, 1);
    }

    #[test]
    fn ring_double_bond_does_not_make_nitrogen_amide_like() {
        // 2-Pyridone-like lactam with exocyclic C=O: N is excluded.
        assert_eq!(descriptors("O=C1CCCN1").h_bond_acceptors, 1);
        // Cyclic amidine: the C=N lies in the ring, so the amine N still counts.
        assert_eq!(descriptors("C1CN=CN1").h_bond_acceptors, 2);
    }

    #[test]
    fn aromatic_heteroatoms_are_typed() {
        let pyridine = descriptors("c1ccncc1");
        assert_eq!(pyridine.h_bond_acceptors, 1);
        assert_eq!(pyridine.h_bond_donors, 0);

        let pyrrole = descriptors("c1cc[nH]c1");
        assert_eq!(pyrrole.h_bond_donors, 1);
        assert_eq!(pyrrole.h_bond_acceptors, 0);
    }

    #[test]
    fn values_follow_declared_name_order() {
        let d = descriptors(LINALOOL);
        let v = d.values();
        assert_eq!(v[0], d.molecular_weight);
        assert_eq!(v[1], d.log_p);
        assert_eq!(v[2], d.polarizability);
        assert_eq!(v[3], 1.0);
        assert_eq!(v[4], 1.0);
        assert_eq!(DescriptorSet::NAMES.len(), v.len());
    }
}
