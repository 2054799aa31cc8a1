use phf::{Map, phf_map};
use std::fmt;

/// Static per-element data used by the SMILES reader and the descriptor calculator.
#[derive(Debug, PartialEq)]
pub struct Element {
    /// The element symbol with canonical capitalization (e.g., "C", "Cl").
    pub symbol: &'static str,
    pub atomic_number: u8,
    /// Standard atomic weight in g/mol.
    pub average_mass: f64,
    /// Bond radius in Angstroms; ideal bond lengths are sums of bond radii.
    pub bond_radius: f64,
    /// Allowed valences in ascending order. Empty for elements without an
    /// implicit-hydrogen model (they must be written as bracket atoms).
    pub default_valences: &'static [u8],
}

impl Element {
    /// Looks up an element by its symbol. Lookup is case-sensitive.
    pub fn from_symbol(symbol: &str) -> Option<&'static Element> {
        ELEMENTS.get(symbol)
    }

    pub fn hydrogen() -> &'static Element {
        &ELEMENTS["H"]
    }

    /// Elements that may appear outside brackets in SMILES.
    pub fn is_organic_subset(&self) -> bool {
        matches!(
            self.symbol,
            "B" | "C" | "N" | "O" | "P" | "S" | "F" | "Cl" | "Br" | "I"
        )
    }

    /// Elements that may carry the SMILES aromatic (lowercase) form.
    pub fn can_be_aromatic(&self) -> bool {
        matches!(self.symbol, "B" | "C" | "N" | "O" | "P" | "S" | "Se" | "As")
    }

    pub fn is_carbon(&self) -> bool {
        self.atomic_number == 6
    }

    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == 1
    }

    pub fn max_valence(&self) -> Option<u8> {
        self.default_valences.last().copied()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

#[rustfmt::skip]
static ELEMENTS: Map<&'static str, Element> = phf_map! {
    "H"  => Element { symbol: "H",  atomic_number: 1,  average_mass: 1.008,   bond_radius: 0.23, default_valences: &[1] },
    "Li" => Element { symbol: "Li", atomic_number: 3,  average_mass: 6.941,   bond_radius: 0.68, default_valences: &[] },
    "B"  => Element { symbol: "B",  atomic_number: 5,  average_mass: 10.812,  bond_radius: 0.82, default_valences: &[3] },
    "C"  => Element { symbol: "C",  atomic_number: 6,  average_mass: 12.011,  bond_radius: 0.77, default_valences: &[4] },
    "N"  => Element { symbol: "N",  atomic_number: 7,  average_mass: 14.007,  bond_radius: 0.70, default_valences: &[3, 5] },
    "O"  => Element { symbol: "O",  atomic_number: 8,  average_mass: 15.999,  bond_radius: 0.66, default_valences: &[2] },
    "F"  => Element { symbol: "F",  atomic_number: 9,  average_mass: 18.998,  bond_radius: 0.611, default_valences: &[1] },
    "Na" => Element { symbol: "Na", atomic_number: 11, average_mass: 22.990,  bond_radius: 0.97, default_valences: &[] },
    "Mg" => Element { symbol: "Mg", atomic_number: 12, average_mass: 24.305,  bond_radius: 1.10, default_valences: &[] },
    "Si" => Element { symbol: "Si", atomic_number: 14, average_mass: 28.086,  bond_radius: 1.17, default_valences: &[] },
    "P"  => Element { symbol: "P",  atomic_number: 15, average_mass: 30.974,  bond_radius: 1.10, default_valences: &[3, 5] },
    "S"  => Element { symbol: "S",  atomic_number: 16, average_mass: 32.067,  bond_radius: 1.04, default_valences: &[2, 4, 6] },
    "Cl" => Element { symbol: "Cl", atomic_number: 17, average_mass: 35.453,  bond_radius: 0.997, default_valences: &[1] },
    "K"  => Element { symbol: "K",  atomic_number: 19, average_mass: 39.098,  bond_radius: 1.33, default_valences: &[] },
    "Ca" => Element { symbol: "Ca", atomic_number: 20, average_mass: 40.078,  bond_radius: 0.99, default_valences: &[] },
    "Fe" => Element { symbol: "Fe", atomic_number: 26, average_mass: 55.845,  bond_radius: 1.17, default_valences: &[] },
    "Cu" => Element { symbol: "Cu", atomic_number: 29, average_mass: 63.546,  bond_radius: 1.17, default_valences: &[] },
    "Zn" => Element { symbol: "Zn", atomic_number: 30, average_mass: 65.39,   bond_radius: 1.25, default_valences: &[] },
    "As" => Element { symbol: "As", atomic_number: 33, average_mass: 74.922,  bond_radius: 1.21, default_valences: &[] },
    "Se" => Element { symbol: "Se", atomic_number: 34, average_mass: 78.96,   bond_radius: 1.17, default_valences: &[] },
    "Br" => Element { symbol: "Br", atomic_number: 35, average_mass: 79.904,  bond_radius: 1.14, default_valences: &[1] },
    "I"  => Element { symbol: "I",  atomic_number: 53, average_mass: 126.904, bond_radius: 1.33, default_valences: &[1] },
};
