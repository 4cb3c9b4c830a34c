//! Hierarchy builder: flat page plan → nested wiki structure.
//!
//! Pages attach to their declared parent when it exists in the plan and to
//! the top level otherwise. The builder never fails; questionable plans
//! are repaired deterministically:
//!
//! - duplicate filenames keep their first occurrence
//! - a page naming itself as parent becomes top-level
//! - a parent link cycle is broken by promoting its first member (in plan
//!   order) to top-level
//!
//! so every distinct filename appears exactly once in the output, and
//! sibling order always follows plan order.

use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use super::types::{FlatPage, FlatWikiStructure, Page, WikiStructure};

/// Something odd in a flat plan. Advisory: the builder repairs all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanIssue {
    DuplicateFile { file: String },
    SelfParent { file: String },
    MissingParent { file: String, parent: String },
    /// Parent is declared later in the plan than the child
    ForwardParent { file: String, parent: String },
    Cycle { file: String },
}

impl fmt::Display for PlanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFile { file } => {
                write!(f, "duplicate page file '{}', later entries dropped", file)
            }
            Self::SelfParent { file } => write!(f, "page '{}' is its own parent", file),
            Self::MissingParent { file, parent } => {
                write!(f, "page '{}' names unknown parent '{}'", file, parent)
            }
            Self::ForwardParent { file, parent } => write!(
                f,
                "page '{}' names parent '{}' which is declared after it",
                file, parent
            ),
            Self::Cycle { file } => {
                write!(f, "page '{}' is part of a parent cycle and was promoted", file)
            }
        }
    }
}

/// Plan after duplicate removal, with each page's effective parent
struct Resolved<'a> {
    pages: Vec<&'a FlatPage>,
    parents: HashMap<&'a str, Option<&'a str>>,
    issues: Vec<PlanIssue>,
}

fn resolve(flat: &FlatWikiStructure) -> Resolved<'_> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut pages = Vec::with_capacity(flat.pages.len());

    for page in &flat.pages {
        if seen.insert(page.file.as_str()) {
            pages.push(page);
        } else {
            issues.push(PlanIssue::DuplicateFile {
                file: page.file.clone(),
            });
        }
    }

    let mut parents: HashMap<&str, Option<&str>> = HashMap::with_capacity(pages.len());
    for page in &pages {
        let parent = match page.parent_file.as_deref() {
            None => None,
            Some(parent) if parent == page.file => {
                issues.push(PlanIssue::SelfParent {
                    file: page.file.clone(),
                });
                None
            }
            Some(parent) if !seen.contains(parent) => {
                issues.push(PlanIssue::MissingParent {
                    file: page.file.clone(),
                    parent: parent.to_string(),
                });
                None
            }
            Some(parent) => Some(parent),
        };
        parents.insert(page.file.as_str(), parent);
    }

    // Walking up from a cycle member always returns to it
    for page in &pages {
        let start = page.file.as_str();
        let mut visited = HashSet::new();
        let mut current = parents.get(start).copied().flatten();
        while let Some(node) = current {
            if node == start {
                issues.push(PlanIssue::Cycle {
                    file: page.file.clone(),
                });
                parents.insert(start, None);
                break;
            }
            if !visited.insert(node) {
                break;
            }
            current = parents.get(node).copied().flatten();
        }
    }

    Resolved {
        pages,
        parents,
        issues,
    }
}

/// Nest a flat plan. Pure and deterministic.
pub fn nest(flat: &FlatWikiStructure) -> WikiStructure {
    let resolved = resolve(flat);
    for issue in &resolved.issues {
        debug!("Repairing wiki plan: {}", issue);
    }

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut top_level: Vec<&str> = Vec::new();
    for page in &resolved.pages {
        let file = page.file.as_str();
        match resolved.parents.get(file).copied().flatten() {
            Some(parent) => children.entry(parent).or_default().push(file),
            None => {
                if let Some(declared) = page.parent_file.as_deref()
                    && declared != file
                    && !resolved.parents.contains_key(declared)
                {
                    warn!(
                        "Orphan page '{}' (parent '{}' not in plan) placed at top level",
                        file, declared
                    );
                } else {
                    debug!("Top-level page '{}'", file);
                }
                top_level.push(file);
            }
        }
    }

    let titles: HashMap<&str, &str> = resolved
        .pages
        .iter()
        .map(|p| (p.file.as_str(), p.title.as_str()))
        .collect();

    WikiStructure {
        title: flat.title.clone(),
        pages: top_level
            .into_iter()
            .map(|file| build(file, &titles, &children))
            .collect(),
    }
}

fn build(file: &str, titles: &HashMap<&str, &str>, children: &HashMap<&str, Vec<&str>>) -> Page {
    Page {
        title: titles.get(file).copied().unwrap_or_default().to_string(),
        file: file.to_string(),
        pages: children
            .get(file)
            .map(|kids| kids.iter().map(|kid| build(kid, titles, children)).collect())
            .unwrap_or_default(),
    }
}

/// Everything questionable about a plan, in detection order
pub fn validate_plan(flat: &FlatWikiStructure) -> Vec<PlanIssue> {
    let mut issues = resolve(flat).issues;

    let mut declared = HashSet::new();
    let all: HashSet<&str> = flat.pages.iter().map(|p| p.file.as_str()).collect();
    for page in &flat.pages {
        if let Some(parent) = page.parent_file.as_deref()
            && parent != page.file
            && all.contains(parent)
            && !declared.contains(parent)
        {
            issues.push(PlanIssue::ForwardParent {
                file: page.file.clone(),
                parent: parent.to_string(),
            });
        }
        declared.insert(page.file.as_str());
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn page(title: &str, file: &str, parent: Option<&str>) -> FlatPage {
        FlatPage {
            title: title.to_string(),
            file: file.to_string(),
            parent_file: parent.map(String::from),
        }
    }

    fn plan(pages: Vec<FlatPage>) -> FlatWikiStructure {
        FlatWikiStructure {
            title: "W".to_string(),
            pages,
        }
    }

    fn files(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.file.as_str()).collect()
    }

    #[test]
    fn test_nest_basic_hierarchy() {
        let nested = nest(&plan(vec![
            page("A", "a.md", None),
            page("B", "b.md", Some("a.md")),
            page("C", "c.md", Some("missing.md")),
        ]));

        assert_eq!(nested.title, "W");
        assert_eq!(files(&nested.pages), vec!["a.md", "c.md"]);
        assert_eq!(files(&nested.pages[0].pages), vec!["b.md"]);
        assert!(nested.pages[1].pages.is_empty());
    }

    #[test]
    fn test_forward_parent_still_attached() {
        let flat = plan(vec![
            page("Child", "02_01.md", Some("02.md")),
            page("Parent", "02.md", None),
        ]);
        let nested = nest(&flat);
        assert_eq!(files(&nested.pages), vec!["02.md"]);
        assert_eq!(files(&nested.pages[0].pages), vec!["02_01.md"]);

        assert_eq!(
            validate_plan(&flat),
            vec![PlanIssue::ForwardParent {
                file: "02_01.md".to_string(),
                parent: "02.md".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicates_keep_first() {
        let flat = plan(vec![
            page("First", "a.md", None),
            page("Second", "a.md", None),
        ]);
        let nested = nest(&flat);
        assert_eq!(nested.pages.len(), 1);
        assert_eq!(nested.pages[0].title, "First");
        assert_eq!(
            validate_plan(&flat),
            vec![PlanIssue::DuplicateFile {
                file: "a.md".to_string()
            }]
        );
    }

    #[test]
    fn test_self_parent_and_cycle_promoted() {
        let flat = plan(vec![
            page("Self", "s.md", Some("s.md")),
            page("X", "x.md", Some("y.md")),
            page("Y", "y.md", Some("x.md")),
            page("Z", "z.md", Some("y.md")),
        ]);
        let nested = nest(&flat);

        assert_eq!(files(&nested.pages), vec!["s.md", "x.md"]);
        assert_eq!(files(&nested.pages[1].pages), vec!["y.md"]);
        assert_eq!(files(&nested.pages[1].pages[0].pages), vec!["z.md"]);

        let issues = validate_plan(&flat);
        assert!(issues.contains(&PlanIssue::SelfParent {
            file: "s.md".to_string()
        }));
        assert!(issues.contains(&PlanIssue::Cycle {
            file: "x.md".to_string()
        }));
    }

    #[test]
    fn test_empty_plan() {
        let nested = nest(&plan(vec![]));
        assert!(nested.pages.is_empty());
        assert!(validate_plan(&plan(vec![])).is_empty());
    }

    #[test]
    fn test_issue_display() {
        let issue = PlanIssue::MissingParent {
            file: "c.md".to_string(),
            parent: "x.md".to_string(),
        };
        assert_eq!(issue.to_string(), "page 'c.md' names unknown parent 'x.md'");
    }

    fn arb_plan() -> impl Strategy<Value = FlatWikiStructure> {
        let file = (0u8..8).prop_map(|n| format!("{:02}.md", n));
        let parent = proptest::option::of((0u8..10).prop_map(|n| format!("{:02}.md", n)));
        proptest::collection::vec((file, parent), 0..16).prop_map(|entries| FlatWikiStructure {
            title: "P".to_string(),
            pages: entries
                .into_iter()
                .map(|(file, parent_file)| FlatPage {
                    title: format!("T{}", file),
                    file,
                    parent_file,
                })
                .collect(),
        })
    }

    fn collect_files(pages: &[Page], out: &mut Vec<String>) {
        for p in pages {
            out.push(p.file.clone());
            collect_files(&p.pages, out);
        }
    }

    proptest! {
        #[test]
        fn prop_every_distinct_file_exactly_once(flat in arb_plan()) {
            let nested = nest(&flat);
            let mut seen = Vec::new();
            collect_files(&nested.pages, &mut seen);

            let mut expected: Vec<String> = flat.pages.iter().map(|p| p.file.clone()).collect();
            expected.sort();
            expected.dedup();
            let mut got = seen.clone();
            got.sort();
            got.dedup();
            prop_assert_eq!(got.len(), seen.len());
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn prop_nest_is_deterministic(flat in arb_plan()) {
            prop_assert_eq!(nest(&flat), nest(&flat));
        }

        #[test]
        fn prop_siblings_follow_plan_order(flat in arb_plan()) {
            let order: HashMap<String, usize> = flat
                .pages
                .iter()
                .enumerate()
                .rev()
                .map(|(i, p)| (p.file.clone(), i))
                .collect();

            fn check(pages: &[Page], order: &HashMap<String, usize>) -> bool {
                pages.windows(2).all(|w| order[&w[0].file] < order[&w[1].file])
                    && pages.iter().all(|p| check(&p.pages, order))
            }
            prop_assert!(check(&nested_pages(&flat), &order));
        }

        #[test]
        fn prop_valid_parents_respected(flat in arb_plan()) {
            let nested = nest(&flat);
            let issues = validate_plan(&flat);
            let clean = !issues.iter().any(|i| !matches!(i, PlanIssue::ForwardParent { .. }));
            if clean {
                for (page, _) in nested.walk() {
                    for child in &page.pages {
                        let declared = flat.pages.iter().find(|p| p.file == child.file)
                            .and_then(|p| p.parent_file.clone());
                        prop_assert_eq!(declared.as_deref(), Some(page.file.as_str()));
                    }
                }
            }
        }
    }

    fn nested_pages(flat: &FlatWikiStructure) -> Vec<Page> {
        nest(flat).pages
    }
}
