//! Project description and the dependency resolver that orders its targets.
//!
//! Project files are JSON5 so hand-written build descriptions may carry
//! comments and trailing commas:
//!
//! ```json5
//! {
//!   name: "demo",
//!   default: "dist",
//!   targets: [
//!     { name: "init", tasks: ["mkdir"] },
//!     { name: "compile", depends: "init", tasks: ["javac", "copy"] },
//!     { name: "dist", depends: ["compile"], tasks: ["jar"] },
//!   ],
//! }
//! ```

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::{SortError, VisualizeError};
use crate::ir::{Target, Task};

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "default")]
    pub default_target: Option<String>,
    #[serde(default)]
    pub targets: Vec<TargetDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetDef {
    pub name: String,
    #[serde(default)]
    pub depends: Depends,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `depends` as either a list or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Depends {
    List(Vec<String>),
    Csv(String),
}

impl Default for Depends {
    fn default() -> Self {
        Depends::List(Vec::new())
    }
}

impl Depends {
    pub fn names(&self) -> Vec<String> {
        match self {
            Depends::List(list) => list.iter().map(|name| name.trim().to_string()).collect(),
            Depends::Csv(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

impl Project {
    /// Parse a project file. Target names must be unique.
    pub fn parse(input: &str) -> Result<Self, VisualizeError> {
        let project: Project = json5::from_str(input).map_err(VisualizeError::Project)?;
        let mut seen = HashSet::with_capacity(project.targets.len());
        for target in &project.targets {
            if !seen.insert(target.name.as_str()) {
                return Err(VisualizeError::DuplicateTarget(target.name.clone()));
            }
        }
        Ok(project)
    }

    pub fn target(&self, name: &str) -> Option<&TargetDef> {
        self.targets.iter().find(|target| target.name == name)
    }

    /// Resolve the start target: the explicit name, otherwise the project default.
    pub fn resolve_root<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str, SortError> {
        requested
            .or(self.default_target.as_deref())
            .ok_or_else(|| SortError::NoTarget {
                project: self.name.clone(),
            })
    }

    /// Order every target reachable from `root` so that dependencies precede
    /// their dependents. Dependencies are visited in declaration order and each
    /// target appears once.
    pub fn topo_sort(&self, root: &str) -> Result<Vec<Target>, SortError> {
        // First definition wins, matching `Project::target`.
        let mut table: HashMap<&str, &TargetDef> = HashMap::with_capacity(self.targets.len());
        for target in &self.targets {
            table.entry(target.name.as_str()).or_insert(target);
        }
        let mut state: HashMap<String, VisitState> = HashMap::new();
        let mut visiting: Vec<String> = Vec::new();
        let mut sorted = Vec::new();
        self.visit(root, &table, &mut state, &mut visiting, &mut sorted)?;
        tracing::debug!(root, count = sorted.len(), "targets sorted");
        Ok(sorted)
    }

    fn visit(
        &self,
        name: &str,
        table: &HashMap<&str, &TargetDef>,
        state: &mut HashMap<String, VisitState>,
        visiting: &mut Vec<String>,
        sorted: &mut Vec<Target>,
    ) -> Result<(), SortError> {
        let Some(def) = table.get(name) else {
            return Err(SortError::MissingTarget {
                name: name.to_string(),
                project: self.name.clone(),
                required_by: visiting.last().cloned(),
            });
        };
        state.insert(name.to_string(), VisitState::Visiting);
        visiting.push(name.to_string());

        for dep in def.depends.names() {
            match state.get(&dep) {
                None => self.visit(&dep, table, state, visiting, sorted)?,
                Some(VisitState::Visiting) => return Err(cycle_error(&dep, visiting)),
                Some(VisitState::Visited) => {}
            }
        }

        visiting.pop();
        state.insert(name.to_string(), VisitState::Visited);
        sorted.push(Target {
            name: def.name.clone(),
            tasks: def.tasks.iter().map(Task::new).collect(),
        });
        Ok(())
    }
}

fn cycle_error(end: &str, visiting: &[String]) -> SortError {
    let mut chain = vec![end.to_string()];
    for name in visiting.iter().rev() {
        chain.push(name.clone());
        if name == end {
            break;
        }
    }
    SortError::Cycle { chain }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(targets: &[Target]) -> Vec<&str> {
        targets.iter().map(|t| t.name.as_str()).collect()
    }

    const DEMO: &str = r#"{
        name: "demo",
        default: "dist",
        targets: [
            { name: "init", tasks: ["mkdir"] },
            { name: "compile", depends: "init", tasks: ["javac", "copy"] },
            { name: "test", depends: "compile", tasks: ["junit"] },
            { name: "dist", depends: ["compile", "test"], tasks: ["jar"] },
            { name: "clean", tasks: ["delete"] },
        ],
    }"#;

    #[test]
    fn sorts_dependencies_first() {
        let project = Project::parse(DEMO).unwrap();
        let sorted = project.topo_sort("dist").unwrap();
        assert_eq!(names(&sorted), vec!["init", "compile", "test", "dist"]);
        assert_eq!(sorted[1].tasks, vec![Task::new("javac"), Task::new("copy")]);
    }

    #[test]
    fn unreachable_targets_are_left_out() {
        let project = Project::parse(DEMO).unwrap();
        let sorted = project.topo_sort("compile").unwrap();
        assert_eq!(names(&sorted), vec!["init", "compile"]);
    }

    #[test]
    fn default_target_is_used_without_request() {
        let project = Project::parse(DEMO).unwrap();
        assert_eq!(project.resolve_root(None).unwrap(), "dist");
        assert_eq!(project.resolve_root(Some("clean")).unwrap(), "clean");
    }

    #[test]
    fn missing_root_and_missing_dependency() {
        let project = Project::parse(
            r#"{ name: "p", targets: [{ name: "a", depends: "ghost" }] }"#,
        )
        .unwrap();
        assert_eq!(
            project.topo_sort("nope").unwrap_err(),
            SortError::MissingTarget {
                name: "nope".into(),
                project: "p".into(),
                required_by: None,
            }
        );
        assert_eq!(
            project.topo_sort("a").unwrap_err(),
            SortError::MissingTarget {
                name: "ghost".into(),
                project: "p".into(),
                required_by: Some("a".into()),
            }
        );
        assert!(matches!(
            project.resolve_root(None),
            Err(SortError::NoTarget { .. })
        ));
    }

    #[test]
    fn detects_cycles() {
        let project = Project::parse(
            r#"{ name: "p", targets: [
                { name: "a", depends: "b" },
                { name: "b", depends: "c" },
                { name: "c", depends: "a" },
            ] }"#,
        )
        .unwrap();
        assert_eq!(
            project.topo_sort("a").unwrap_err(),
            SortError::Cycle {
                chain: vec!["a".into(), "c".into(), "b".into(), "a".into()],
            }
        );
    }

    #[test]
    fn csv_depends_ignores_blank_entries() {
        let depends = Depends::Csv(" init , ,compile ".into());
        assert_eq!(depends.names(), vec!["init", "compile"]);
    }

    #[test]
    fn malformed_project_is_rejected() {
        assert!(matches!(
            Project::parse("{ targets: [ { tasks: [] } ] }"),
            Err(VisualizeError::Project(_))
        ));
    }

    #[test]
    fn malformed_project_keeps_parser_error_as_source() {
        let err = Project::parse("{ targets: [ ").unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn duplicate_target_names_are_rejected() {
        let err = Project::parse(
            r#"{ targets: [ { name: "a", tasks: ["x"] }, { name: "b" }, { name: "a", tasks: ["y"] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(&err, VisualizeError::DuplicateTarget(name) if name == "a"));
        assert_eq!(err.to_string(), "target \"a\" is defined more than once");
    }

    #[test]
    fn lookup_and_sort_agree_on_first_definition() {
        let project = Project {
            name: "demo".into(),
            default_target: None,
            targets: vec![
                TargetDef {
                    name: "a".into(),
                    depends: Depends::default(),
                    tasks: vec!["first".into()],
                    description: None,
                },
                TargetDef {
                    name: "a".into(),
                    depends: Depends::default(),
                    tasks: vec!["second".into()],
                    description: None,
                },
            ],
        };
        assert_eq!(project.target("a").unwrap().tasks, vec!["first"]);
        let sorted = project.topo_sort("a").unwrap();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].tasks[0].name, "first");
    }
}
