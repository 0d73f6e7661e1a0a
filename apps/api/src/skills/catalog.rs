//! Static skill catalog: recognised languages and keyword-detected skills.

use crate::models::SkillCategory;
use crate::skills::normalize::skill_key;

pub struct LanguageSpec {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    /// Regexes that indicate source written in this language.
    pub signatures: &'static [&'static str],
    /// Terms that name the language in prose. Kept unambiguous ("golang", not "go").
    pub text_terms: &'static [&'static str],
}

pub struct CatalogEntry {
    pub name: &'static str,
    pub category: SkillCategory,
    pub keywords: &'static [&'static str],
}

// Order matters for detection ties: more specific languages first.
pub const LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        name: "TypeScript",
        extensions: &["ts", "tsx"],
        signatures: &[
            r"\binterface\s+\w+\s*\{",
            r"\btype\s+\w+\s*=",
            r":\s*(string|number|boolean)\b",
        ],
        text_terms: &["typescript"],
    },
    LanguageSpec {
        name: "Python",
        extensions: &["py", "pyw"],
        signatures: &[
            r"(?m)^\s*def\s+\w+\s*\(",
            r"(?m)^\s*from\s+[\w.]+\s+import\s+",
            r#"if\s+__name__\s*==\s*['"]__main__['"]"#,
            r"(?m)^\s*elif\b",
        ],
        text_terms: &["python"],
    },
    LanguageSpec {
        name: "JavaScript",
        extensions: &["js", "jsx", "mjs", "cjs"],
        signatures: &[
            r"\bfunction\s+\w+\s*\(",
            r"\bconst\s+\w+\s*=",
            r"\bconsole\.log\(",
            r"\brequire\(['\x22]",
        ],
        text_terms: &["javascript"],
    },
    LanguageSpec {
        name: "Java",
        extensions: &["java"],
        signatures: &[
            r"\bpublic\s+class\s+\w+",
            r"\bpublic\s+static\s+void\s+main\b",
            r"\bSystem\.out\.println\(",
        ],
        text_terms: &["java"],
    },
    LanguageSpec {
        name: "C#",
        extensions: &["cs"],
        signatures: &[r"\busing\s+System\b", r"\bConsole\.WriteLine\(", r"\bnamespace\s+\w+"],
        text_terms: &["c#", "csharp"],
    },
    LanguageSpec {
        name: "C++",
        extensions: &["cpp", "cc", "cxx", "hpp", "hh"],
        signatures: &[r"#include\s*<\w+>", r"\bstd::", r"\bcout\s*<<"],
        text_terms: &["c++", "cpp"],
    },
    LanguageSpec {
        name: "Rust",
        extensions: &["rs"],
        signatures: &[
            r"\bfn\s+\w+\s*[(<]",
            r"\blet\s+mut\s+\w+",
            r"\bimpl\b[^{]*\{",
            r"\buse\s+\w+::",
        ],
        text_terms: &["rust"],
    },
    LanguageSpec {
        name: "Go",
        extensions: &["go"],
        signatures: &[r"(?m)^package\s+\w+", r"\bfunc\s+\w+\s*\(", r"\bfmt\.Print"],
        text_terms: &["golang"],
    },
    LanguageSpec {
        name: "Ruby",
        extensions: &["rb"],
        signatures: &[r"(?m)^\s*def\s+\w+\s*$", r"(?m)^\s*puts\s+", r"(?m)^\s*end\s*$"],
        text_terms: &["ruby"],
    },
    LanguageSpec {
        name: "PHP",
        extensions: &["php"],
        signatures: &[r"<\?php", r"\$\w+\s*=", r"\becho\s+"],
        text_terms: &["php"],
    },
    LanguageSpec {
        name: "Kotlin",
        extensions: &["kt", "kts"],
        signatures: &[r"\bfun\s+\w+\s*\(", r"\bval\s+\w+\s*[:=]"],
        text_terms: &["kotlin"],
    },
    LanguageSpec {
        name: "Swift",
        extensions: &["swift"],
        signatures: &[r"\bimport\s+(UIKit|SwiftUI|Foundation)\b", r"\bguard\s+let\b"],
        text_terms: &["swift"],
    },
    LanguageSpec {
        name: "SQL",
        extensions: &["sql"],
        signatures: &[
            r"(?i)\bselect\s+.+\s+from\s+\w+",
            r"(?i)\binsert\s+into\b",
            r"(?i)\bcreate\s+table\b",
        ],
        text_terms: &["sql"],
    },
];

pub const CATALOG: &[CatalogEntry] = &[
    // Frameworks, libraries, platforms
    CatalogEntry {
        name: "React",
        category: SkillCategory::Framework,
        keywords: &["react", "usestate", "useeffect", "jsx"],
    },
    CatalogEntry {
        name: "Vue.js",
        category: SkillCategory::Framework,
        keywords: &["vue", "vuex", "nuxt"],
    },
    CatalogEntry {
        name: "Angular",
        category: SkillCategory::Framework,
        keywords: &["angular", "ngmodule"],
    },
    CatalogEntry {
        name: "Node.js",
        category: SkillCategory::Framework,
        keywords: &["node.js", "nodejs", "npm"],
    },
    CatalogEntry {
        name: "Express",
        category: SkillCategory::Framework,
        keywords: &["express"],
    },
    CatalogEntry {
        name: "Django",
        category: SkillCategory::Framework,
        keywords: &["django"],
    },
    CatalogEntry {
        name: "Flask",
        category: SkillCategory::Framework,
        keywords: &["flask"],
    },
    CatalogEntry {
        name: "FastAPI",
        category: SkillCategory::Framework,
        keywords: &["fastapi", "pydantic"],
    },
    CatalogEntry {
        name: "Spring",
        category: SkillCategory::Framework,
        keywords: &["springframework", "spring boot", "springbootapplication"],
    },
    CatalogEntry {
        name: "Tokio",
        category: SkillCategory::Framework,
        keywords: &["tokio"],
    },
    CatalogEntry {
        name: "Pandas",
        category: SkillCategory::Framework,
        keywords: &["pandas", "dataframe"],
    },
    CatalogEntry {
        name: "NumPy",
        category: SkillCategory::Framework,
        keywords: &["numpy"],
    },
    CatalogEntry {
        name: "PyTorch",
        category: SkillCategory::Framework,
        keywords: &["pytorch", "torch"],
    },
    CatalogEntry {
        name: "TensorFlow",
        category: SkillCategory::Framework,
        keywords: &["tensorflow", "keras"],
    },
    CatalogEntry {
        name: "PostgreSQL",
        category: SkillCategory::Framework,
        keywords: &["postgresql", "postgres", "psycopg2"],
    },
    CatalogEntry {
        name: "MySQL",
        category: SkillCategory::Framework,
        keywords: &["mysql"],
    },
    CatalogEntry {
        name: "MongoDB",
        category: SkillCategory::Framework,
        keywords: &["mongodb", "pymongo", "mongoose"],
    },
    CatalogEntry {
        name: "Redis",
        category: SkillCategory::Framework,
        keywords: &["redis"],
    },
    CatalogEntry {
        name: "Docker",
        category: SkillCategory::Framework,
        keywords: &["docker", "dockerfile"],
    },
    CatalogEntry {
        name: "Kubernetes",
        category: SkillCategory::Framework,
        keywords: &["kubernetes", "k8s", "kubectl"],
    },
    CatalogEntry {
        name: "AWS",
        category: SkillCategory::Framework,
        keywords: &["aws", "boto3", "ec2", "lambda_handler"],
    },
    CatalogEntry {
        name: "Git",
        category: SkillCategory::Framework,
        keywords: &["git"],
    },
    CatalogEntry {
        name: "Testing",
        category: SkillCategory::Framework,
        keywords: &["pytest", "unittest", "jest", "mocha", "junit"],
    },
    // Algorithms
    CatalogEntry {
        name: "Binary Search",
        category: SkillCategory::Algorithm,
        keywords: &["binary search", "binary_search", "bisect"],
    },
    CatalogEntry {
        name: "Dynamic Programming",
        category: SkillCategory::Algorithm,
        keywords: &["dynamic programming", "memoization", "memoize", "lru_cache"],
    },
    CatalogEntry {
        name: "Sorting",
        category: SkillCategory::Algorithm,
        keywords: &["quicksort", "mergesort", "heapsort", "sorted", "sort"],
    },
    CatalogEntry {
        name: "Breadth-First Search",
        category: SkillCategory::Algorithm,
        keywords: &["bfs", "breadth-first", "breadth first"],
    },
    CatalogEntry {
        name: "Depth-First Search",
        category: SkillCategory::Algorithm,
        keywords: &["dfs", "depth-first", "depth first", "backtrack"],
    },
    CatalogEntry {
        name: "Greedy",
        category: SkillCategory::Algorithm,
        keywords: &["greedy"],
    },
    // Data structures
    CatalogEntry {
        name: "Hash Table",
        category: SkillCategory::DataStructure,
        keywords: &["hashmap", "hashset", "unordered_map", "dict", "hash table"],
    },
    CatalogEntry {
        name: "Linked List",
        category: SkillCategory::DataStructure,
        keywords: &["linked list", "linkedlist", "listnode"],
    },
    CatalogEntry {
        name: "Tree",
        category: SkillCategory::DataStructure,
        keywords: &["treenode", "binary tree", "bst", "trie"],
    },
    CatalogEntry {
        name: "Heap",
        category: SkillCategory::DataStructure,
        keywords: &["heapq", "priorityqueue", "priority_queue", "binaryheap"],
    },
    CatalogEntry {
        name: "Stack",
        category: SkillCategory::DataStructure,
        keywords: &["stack"],
    },
    CatalogEntry {
        name: "Queue",
        category: SkillCategory::DataStructure,
        keywords: &["queue", "deque", "vecdeque"],
    },
    CatalogEntry {
        name: "Graph",
        category: SkillCategory::DataStructure,
        keywords: &["graph", "adjacency"],
    },
    // Soft skills (prose only)
    CatalogEntry {
        name: "Communication",
        category: SkillCategory::SoftSkill,
        keywords: &["communication", "presented", "stakeholders"],
    },
    CatalogEntry {
        name: "Teamwork",
        category: SkillCategory::SoftSkill,
        keywords: &["teamwork", "collaborated", "collaboration", "cross-functional"],
    },
    CatalogEntry {
        name: "Leadership",
        category: SkillCategory::SoftSkill,
        keywords: &["leadership", "led", "mentored", "mentoring"],
    },
    CatalogEntry {
        name: "Problem Solving",
        category: SkillCategory::SoftSkill,
        keywords: &["problem solving", "problem-solving", "troubleshooting"],
    },
];

pub fn language_by_name(name: &str) -> Option<&'static LanguageSpec> {
    let key = skill_key(name);
    LANGUAGES.iter().find(|l| skill_key(l.name) == key)
}

pub fn language_by_extension(file_name: &str) -> Option<&'static LanguageSpec> {
    let ext = file_name.rsplit_once('.')?.1.to_lowercase();
    LANGUAGES.iter().find(|l| l.extensions.contains(&ext.as_str()))
}

/// Looks up a catalog entry by name or by one of its keywords.
pub fn entry_for(name: &str) -> Option<&'static CatalogEntry> {
    let key = skill_key(name);
    CATALOG
        .iter()
        .find(|e| skill_key(e.name) == key)
        .or_else(|| CATALOG.iter().find(|e| e.keywords.contains(&key.as_str())))
}

/// Best-known category for a skill name.
pub fn category_for(name: &str) -> Option<SkillCategory> {
    if language_by_name(name).is_some() {
        return Some(SkillCategory::Language);
    }
    entry_for(name).map(|e| e.category)
}

/// Counts occurrences of `term` in `haystack` that are not embedded inside
/// a longer identifier. Both arguments must already be lowercase.
pub fn count_term(haystack: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    haystack
        .match_indices(term)
        .filter(|&(start, _)| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[start + term.len()..].chars().next();
            let starts_word = term.chars().next().is_some_and(is_word);
            let ends_word = term.chars().next_back().is_some_and(is_word);
            (!starts_word || !before.is_some_and(is_word))
                && (!ends_word || !after.is_some_and(is_word))
        })
        .count()
}
