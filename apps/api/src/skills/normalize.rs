//! Skill name normalization: case folding, whitespace collapsing and synonyms.
//!
//! Two names refer to the same skill iff their `skill_key` is equal.

/// alias (lowercase) → canonical display name
const SYNONYMS: &[(&str, &str)] = &[
    ("py", "Python"),
    ("python", "Python"),
    ("python3", "Python"),
    ("js", "JavaScript"),
    ("javascript", "JavaScript"),
    ("ecmascript", "JavaScript"),
    ("ts", "TypeScript"),
    ("typescript", "TypeScript"),
    ("node", "Node.js"),
    ("nodejs", "Node.js"),
    ("node.js", "Node.js"),
    ("golang", "Go"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("rustlang", "Rust"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("c++", "C++"),
    ("cplusplus", "C++"),
    ("csharp", "C#"),
    ("c#", "C#"),
    ("dotnet", ".NET"),
    (".net", ".NET"),
    ("sql", "SQL"),
    ("postgres", "PostgreSQL"),
    ("postgresql", "PostgreSQL"),
    ("psql", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mongo", "MongoDB"),
    ("mongodb", "MongoDB"),
    ("react", "React"),
    ("reactjs", "React"),
    ("react.js", "React"),
    ("vue", "Vue.js"),
    ("vuejs", "Vue.js"),
    ("vue.js", "Vue.js"),
    ("k8s", "Kubernetes"),
    ("kubernetes", "Kubernetes"),
    ("aws", "AWS"),
    ("amazon web services", "AWS"),
    ("gcp", "GCP"),
    ("google cloud", "GCP"),
    ("ml", "Machine Learning"),
    ("machine learning", "Machine Learning"),
    ("dp", "Dynamic Programming"),
    ("dynamic programming", "Dynamic Programming"),
    ("bfs", "Breadth-First Search"),
    ("breadth first search", "Breadth-First Search"),
    ("dfs", "Depth-First Search"),
    ("depth first search", "Depth-First Search"),
    ("hash map", "Hash Table"),
    ("hashmap", "Hash Table"),
    ("hash table", "Hash Table"),
    ("hashtable", "Hash Table"),
];

/// Trims and collapses internal whitespace, preserving case.
pub fn collapse(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn lookup(lower: &str) -> Option<&'static str> {
    SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| *canonical)
}

/// Identity key for a skill name: lowercase canonical form.
pub fn skill_key(name: &str) -> String {
    let lower = collapse(name).to_lowercase();
    match lookup(&lower) {
        Some(canonical) => canonical.to_lowercase(),
        None => lower,
    }
}

/// Display form of a skill name. Known aliases map to their canonical
/// spelling; anything else is returned trimmed and whitespace-collapsed.
pub fn canonical_name(name: &str) -> String {
    let collapsed = collapse(name);
    match lookup(&collapsed.to_lowercase()) {
        Some(canonical) => canonical.to_string(),
        None => collapsed,
    }
}
