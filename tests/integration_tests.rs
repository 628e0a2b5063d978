//! Integration tests for descriptor algebra, probability resolution and
//! overlay generation
//!
//! These tests drive the public API end to end on in-memory documents.

use once_cell::sync::Lazy;
use pxml_rs::pxml::condition::{self, Condition};
use pxml_rs::pxml::document::{Document, DocumentLoader, NodeId, QName, Tree};
use pxml_rs::pxml::error::PxmlError;
use pxml_rs::pxml::overlay::{
    child_attribute, value_attribute, ConfigLoader, OverlayConfig, OverlayGenerator,
    OverlaySummary, ProbabilityNodeType, TextNodeStrategy, VariablePool, DEFAULT_NAMESPACE_URI,
    DESCRIPTORS_ATTRIBUTE, VARIABLES_ELEMENT,
};
use pxml_rs::pxml::probability::{MemoryTable, ProbabilityResolver};

const NS: &str = DEFAULT_NAMESPACE_URI;

// ============================================================================
// Fixtures
// ============================================================================

static TABLE: Lazy<MemoryTable> = Lazy::new(|| {
    MemoryTable::parse_yaml(
        r#"
x: { 0: 0.3, 1: 0.7 }
y: { 0: 0.5, 1: 0.5 }
"#,
    )
    .unwrap()
});

/// Eight books, each with a loose text node and three child elements
static CATALOG: Lazy<Document> = Lazy::new(|| {
    let mut doc = Document::new(QName::local("catalog"));
    let root = doc.root();
    for i in 0..8 {
        let book = doc.add_element(root, QName::local("book")).unwrap();
        doc.add_text(book, format!("book {}", i)).unwrap();
        let title = doc.add_element(book, QName::local("title")).unwrap();
        doc.add_text(title, format!("Title {}", i)).unwrap();
        let author = doc.add_element(book, QName::local("author")).unwrap();
        doc.add_text(author, "Anonymous").unwrap();
        doc.add_element(book, QName::local("year")).unwrap();
    }
    doc
});

const CATALOG_CANDIDATES: usize = 32;

fn overlay(config: OverlayConfig) -> (Document, OverlaySummary) {
    let mut doc = CATALOG.clone();
    let summary = OverlayGenerator::new(config)
        .unwrap()
        .transform(&mut doc)
        .unwrap();
    (doc, summary)
}

fn attribute_f64(doc: &Document, node: NodeId, local: &str) -> Option<f64> {
    doc.attribute(node, Some(NS), local)
        .map(|v| v.parse().unwrap())
}

fn variables_pool(doc: &Document) -> NodeId {
    doc.child_elements_named(doc.root(), Some(NS), VARIABLES_ELEMENT)
        .next()
        .unwrap()
}

// ============================================================================
// Descriptor Algebra Tests
// ============================================================================

#[test]
fn test_consistency_examples() {
    assert!(condition::consistent("x=1 y=2 x=1").unwrap());
    assert!(!condition::consistent("x=1 y=2 x=3").unwrap());
    assert!(condition::consistent("").unwrap());
}

#[test]
fn test_mutual_exclusion_examples() {
    assert!(condition::mutually_exclusive("x=1", "x=2 y=0").unwrap());
    assert!(!condition::mutually_exclusive("x=1", "y=0").unwrap());
    assert!(!condition::mutually_exclusive("x=1", "x=1").unwrap());
}

#[test]
fn test_combine_deduplicates() {
    let combined = condition::combine(&["x=1 y=2", "y=2 z=0", "x=1"]).unwrap();
    let conditions = condition::parse(&combined).unwrap();
    assert_eq!(
        conditions,
        vec![
            Condition::new("x", 1),
            Condition::new("y", 2),
            Condition::new("z", 0)
        ]
    );
}

#[test]
fn test_malformed_descriptor_surfaces_as_pxml_error() {
    let err: PxmlError = condition::consistent("x=1 y").unwrap_err().into();
    assert!(matches!(err, PxmlError::Condition(_)));
    assert!(err.to_string().contains("Malformed descriptor"));
}

// ============================================================================
// Probability Resolution Tests
// ============================================================================

#[test]
fn test_probability_of_descriptors() {
    let mut resolver = ProbabilityResolver::new();
    let table: &MemoryTable = &TABLE;

    assert_eq!(resolver.probability(table, "t", "x=1").unwrap(), 0.7);
    assert_eq!(resolver.probability(table, "t", "").unwrap(), 1.0);
    assert_eq!(resolver.probability(table, "t", "q=1").unwrap(), 0.0);

    let p = resolver.probability(table, "t", "x=0 y=1").unwrap();
    assert!((p - 0.15).abs() < 1e-12);

    // Inconsistent descriptors are not special-cased.
    let p = resolver.probability(table, "t", "x=0 x=1").unwrap();
    assert!((p - 0.21).abs() < 1e-12);
}

#[test]
fn test_session_shares_cache() {
    let mut resolver = ProbabilityResolver::new();
    let table: &MemoryTable = &TABLE;

    resolver.probability(table, "t", "x=1 y=0").unwrap();
    resolver.probability(table, "t", "y=0 x=1").unwrap();
    assert_eq!(resolver.cache().len(), 2);
    assert_eq!(resolver.cache().misses(), 2);
    assert_eq!(resolver.cache().hits(), 2);

    resolver.reset();
    assert!(resolver.cache().is_empty());
}

#[test]
fn test_malformed_descriptor_in_probability() {
    let mut resolver = ProbabilityResolver::new();
    let table: &MemoryTable = &TABLE;
    assert!(resolver.probability(table, "t", "x=one").is_err());
}

// ============================================================================
// Overlay Generation Tests
// ============================================================================

#[test]
fn test_overlay_counts() {
    let config = OverlayConfig {
        occurrence: 0.5,
        seed: Some(11),
        ..OverlayConfig::default()
    };
    let (doc, summary) = overlay(config);

    assert_eq!(summary.candidates, CATALOG_CANDIDATES);
    assert_eq!(summary.insertions, CATALOG_CANDIDATES / 2);
    assert_eq!(summary.nodes.values().sum::<usize>(), summary.insertions);

    for (node_type, count) in &summary.nodes {
        assert_eq!(
            doc.elements_named(Some(NS), node_type.node_name())
                .unwrap()
                .len(),
            *count
        );
    }
}

#[test]
fn test_mutex_nodes_are_distributions() {
    let config = OverlayConfig {
        occurrence: 0.5,
        distribution: vec![ProbabilityNodeType::Mutex],
        seed: Some(5),
        ..OverlayConfig::default()
    };
    let (doc, summary) = overlay(config);
    assert_eq!(summary.nodes[&ProbabilityNodeType::Mutex], summary.insertions);

    for node in doc.elements_named(Some(NS), "mux").unwrap() {
        let children = doc.child_nodes(node).len();
        assert!(children >= 1);

        let mut total = attribute_f64(&doc, node, "none").unwrap();
        for i in 1..=children {
            total += attribute_f64(&doc, node, &child_attribute(i)).unwrap();
        }
        assert!((total - 1.0).abs() < 1e-9, "mutex sums to {}", total);
        assert!(attribute_f64(&doc, node, &child_attribute(children + 1)).is_none());
    }
}

#[test]
fn test_independent_nodes_have_one_probability_per_child() {
    let config = OverlayConfig {
        occurrence: 0.5,
        distribution: vec![ProbabilityNodeType::Independent],
        seed: Some(8),
        ..OverlayConfig::default()
    };
    let (doc, _) = overlay(config);

    for node in doc.elements_named(Some(NS), "ind").unwrap() {
        let children = doc.child_nodes(node).len();
        let element = doc.element(node).unwrap();
        assert_eq!(element.attributes().len(), children);
        for i in 1..=children {
            let p = attribute_f64(&doc, node, &child_attribute(i)).unwrap();
            assert!((0.0..1.0).contains(&p));
        }
    }
}

#[test]
fn test_events_descriptors_resolve_through_variables_pool() {
    let config = OverlayConfig {
        occurrence: 0.5,
        distribution: vec![ProbabilityNodeType::Events],
        variables_ratio: 0.5,
        seed: Some(21),
        ..OverlayConfig::default()
    };
    let (doc, summary) = overlay(config);
    assert_eq!(summary.variables, 8);

    let pool_node = variables_pool(&doc);
    let pool = VariablePool::new(&doc, NS);
    assert_eq!(pool.len(), summary.variables);

    let mut resolver = ProbabilityResolver::new();
    let events = doc.elements_named(Some(NS), "cie").unwrap();
    assert_eq!(events.len(), summary.insertions);

    for node in events {
        let descriptor = doc.attribute(node, Some(NS), DESCRIPTORS_ATTRIBUTE).unwrap();
        assert!(condition::consistent(descriptor).unwrap());

        let conditions = condition::parse(descriptor).unwrap();
        assert!(!conditions.is_empty());
        assert!(conditions.len() <= 4);

        let mut expected = 1.0;
        for c in &conditions {
            assert_eq!(
                doc.attribute(node, Some(NS), c.name()),
                Some(c.value().to_string().as_str())
            );
            let var = doc
                .child_elements_named(pool_node, Some(NS), c.name())
                .next()
                .unwrap();
            expected *= attribute_f64(&doc, var, &value_attribute(c.value())).unwrap();
        }

        let p = resolver.probability(&pool, "doc", descriptor).unwrap();
        assert!((p - expected).abs() < 1e-12);
    }
}

#[test]
fn test_variables_pool_on_original_root() {
    let (doc, summary) = overlay(OverlayConfig {
        seed: Some(2),
        ..OverlayConfig::default()
    });

    let root = doc.root();
    assert!(doc
        .element(root)
        .unwrap()
        .name()
        .matches(None, "catalog"));
    assert_eq!(doc.child_nodes(root).last().copied(), Some(variables_pool(&doc)));

    let pool_node = variables_pool(&doc);
    assert_eq!(doc.child_nodes(pool_node).len(), summary.variables);
    for &var in doc.child_nodes(pool_node) {
        let p0 = attribute_f64(&doc, var, &value_attribute(0)).unwrap();
        let p1 = attribute_f64(&doc, var, &value_attribute(1)).unwrap();
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_text_wrap_strategy() {
    let config = OverlayConfig {
        occurrence: 0.5,
        distribution: vec![ProbabilityNodeType::Mutex, ProbabilityNodeType::Independent],
        text_nodes: TextNodeStrategy::Wrap,
        seed: Some(13),
        ..OverlayConfig::default()
    };
    let (doc, _) = overlay(config);

    for local in ["mux", "ind"] {
        for node in doc.elements_named(Some(NS), local).unwrap() {
            for &child in doc.child_nodes(node) {
                assert!(!doc.is_text(child).unwrap());
            }
        }
    }
    for wrapper in doc.elements_named(Some(NS), "text").unwrap() {
        let children = doc.child_nodes(wrapper);
        assert_eq!(children.len(), 1);
        assert!(doc.is_text(children[0]).unwrap());
    }
}

#[test]
fn test_same_seed_same_overlay() {
    let config = OverlayConfig {
        occurrence: 0.4,
        seed: Some(99),
        ..OverlayConfig::default()
    };
    let (first, _) = overlay(config.clone());
    let (second, _) = overlay(config);
    assert_eq!(
        DocumentLoader::to_yaml(&first).unwrap(),
        DocumentLoader::to_yaml(&second).unwrap()
    );
}

// ============================================================================
// Configuration and Snapshot Tests
// ============================================================================

#[test]
fn test_config_file_drives_generator() {
    let config = ConfigLoader::parse_yaml(
        r#"
occurrence: 0.25
distribution: [mux, ind]
text_nodes: wrap
seed: 3
"#,
    )
    .unwrap();
    assert_eq!(config.namespace_prefix, "p");
    assert_eq!(config.text_nodes, TextNodeStrategy::Wrap);

    let (_, summary) = overlay(config);
    assert_eq!(summary.insertions, CATALOG_CANDIDATES / 4);
    assert_eq!(summary.nodes[&ProbabilityNodeType::Events], 0);
}

#[test]
fn test_invalid_config_file() {
    let result = ConfigLoader::parse_yaml("occurrence: 1.5");
    assert!(matches!(result, Err(PxmlError::Overlay(_))));
}

#[test]
fn test_snapshot_load_transform_save_reload() {
    let yaml = DocumentLoader::to_yaml(&CATALOG).unwrap();
    let mut doc = DocumentLoader::parse_yaml(&yaml).unwrap();

    let config = OverlayConfig {
        occurrence: 0.5,
        seed: Some(17),
        ..OverlayConfig::default()
    };
    OverlayGenerator::new(config)
        .unwrap()
        .transform(&mut doc)
        .unwrap();

    let path = std::env::temp_dir().join(format!(
        "pxml-rs-snapshot-{}.yaml",
        std::process::id()
    ));
    let loader = DocumentLoader::new();
    loader.save_document(&doc, &path).unwrap();
    let reloaded = loader.load_document(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(
        DocumentLoader::to_spec(&doc, doc.root()).unwrap(),
        DocumentLoader::to_spec(&reloaded, reloaded.root()).unwrap()
    );
    assert_eq!(
        reloaded.elements_named(Some(NS), VARIABLES_ELEMENT).unwrap().len(),
        1
    );
}

#[test]
fn test_host_prefix_survives_snapshot_round_trip() {
    let yaml = r#"
name: root
attributes:
  xmlns:p: "urn:host"
children:
  - name: p:a
  - name: p:b
  - name: p:c
  - name: p:d
"#;
    let mut doc = DocumentLoader::parse_yaml(yaml).unwrap();
    let clashing = OverlayConfig {
        occurrence: 0.0,
        seed: Some(1),
        ..OverlayConfig::default()
    };
    let err = OverlayGenerator::new(clashing)
        .unwrap()
        .transform(&mut doc)
        .unwrap_err();
    assert!(err.to_string().contains("prefix 'p'"));

    let config = OverlayConfig {
        namespace_prefix: "pr".to_string(),
        occurrence: 0.5,
        seed: Some(1),
        ..OverlayConfig::default()
    };
    OverlayGenerator::new(config)
        .unwrap()
        .transform(&mut doc)
        .unwrap();

    let reloaded = DocumentLoader::parse_yaml(&DocumentLoader::to_yaml(&doc).unwrap()).unwrap();
    assert_eq!(reloaded.namespace_binding(reloaded.root(), "p").unwrap(), Some("urn:host"));
    for local in ["a", "b", "c", "d"] {
        assert_eq!(reloaded.elements_named(Some("urn:host"), local).unwrap().len(), 1);
        assert!(reloaded.elements_named(Some(NS), local).unwrap().is_empty());
    }
    assert_eq!(
        reloaded.elements_named(Some(NS), VARIABLES_ELEMENT).unwrap().len(),
        1
    );
}
