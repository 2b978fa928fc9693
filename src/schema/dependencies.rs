use super::tables::{get_table, ALL_TABLES};
use super::types::TableSchema;
use std::collections::{HashMap, HashSet};

/// Orders tables so that foreign-key parents are created before their children
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let deps = ALL_TABLES
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { deps }
    }

    /// Return every table in dependency order (parents before children)
    pub fn creation_order(&self) -> Result<Vec<&'static TableSchema>, String> {
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        // Walk ALL_TABLES rather than the map so the order is stable between runs
        for table in ALL_TABLES {
            if !visited.contains(table.name) {
                self.visit(table.name, &mut visited, &mut temp_visited, &mut result)?;
            }
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        let table = get_table(name).ok_or_else(|| format!("Unknown table: {}", name))?;

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<&'static str> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                // Skip self-references (tube.parent_id -> tube)
                if dep != name {
                    self.visit(dep, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);
        result.push(table);

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(names: &[&str], name: &str) -> usize {
        names.iter().position(|&n| n == name).unwrap()
    }

    #[test]
    fn test_parents_before_children() {
        let tables = DependencyResolver::new().creation_order().unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name).collect();

        assert_eq!(names.len(), ALL_TABLES.len());
        assert!(position(&names, "village") < position(&names, "trap"));
        assert!(position(&names, "village") < position(&names, "fly"));
        assert!(position(&names, "box") < position(&names, "fly"));
        assert!(position(&names, "fly") < position(&names, "tube"));
        assert!(position(&names, "note") < position(&names, "box_note"));
        assert!(position(&names, "trap") < position(&names, "trap_note"));
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let tables = DependencyResolver::new().creation_order().unwrap();
        assert_eq!(tables.iter().filter(|t| t.name == "tube").count(), 1);
    }
}
