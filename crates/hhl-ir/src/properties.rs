//! Circuit summary statistics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Size and shape of a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CircuitProperties {
    /// Number of operations.
    pub size: usize,
    /// Longest path of operations across any wire.
    pub depth: usize,
    /// Number of qubits.
    pub width: usize,
    /// Number of classical bits.
    pub bits: usize,
    /// Number of independent (unentangled) subsystems, idle wires included.
    pub factors: usize,
    /// Operation counts by name.
    pub operations: BTreeMap<String, usize>,
}

impl fmt::Display for CircuitProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "size:    {}", self.size)?;
        writeln!(f, "depth:   {}", self.depth)?;
        writeln!(f, "width:   {}", self.width)?;
        writeln!(f, "bits:    {}", self.bits)?;
        writeln!(f, "factors: {}", self.factors)?;
        write!(f, "operations:")?;
        for (name, count) in &self.operations {
            write!(f, "\n  {name:<12} {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_flat_map() {
        let mut operations = BTreeMap::new();
        operations.insert("h".to_string(), 2);
        let props = CircuitProperties {
            size: 2,
            depth: 1,
            width: 2,
            bits: 0,
            factors: 2,
            operations,
        };
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["operations"]["h"], 2);
        assert_eq!(json["factors"], 2);
        assert!(props.to_string().contains("h"));
    }
}
