use quadstore::{
    Capacity, Literal, NamedNode, Quad, QuadStream, Store, StoreConfig, Term, Variable,
};
use std::collections::HashSet;

fn nn(s: &str) -> Term {
    NamedNode::new(s).into()
}

fn var(s: &str) -> Term {
    Variable::new(s).unwrap().into()
}

fn quad(s: &str, p: &str, o: &str, g: Option<&str>) -> Quad {
    Quad::new(nn(s), nn(p), nn(o), g.map(nn)).unwrap()
}

/// Eight quads over a handful of subjects, predicates and graphs.
fn match_fixture() -> Store {
    let store = Store::new();
    let rows: [(&str, &str, &str, Option<&str>); 8] = [
        ("subject", "predicate", "object", Some("graph")),
        ("subject", "predicate", "object", None),
        ("subject1", "predicate", "object", Some("graph")),
        ("subject2", "predicate", "object", Some("graph")),
        ("subject3", "predicate", "object", Some("graph")),
        ("subject4", "predicate", "object", Some("graph")),
        ("subject1", "predicate1", "object1", Some("graph1")),
        ("subject1", "predicate1", "object2", Some("graph1")),
    ];
    for (s, p, o, g) in rows {
        assert!(store.add_terms(Some(nn(s)), Some(nn(p)), Some(nn(o)), g.map(nn)));
    }
    store
}

#[test]
fn test_new_store_is_empty() {
    let store = Store::new();
    assert_eq!(store.size(), 0);
    assert!(store.is_empty());
    assert_eq!(store.match_quads(None, None, None, None).count(), 0);
    assert_eq!(store.config(), &StoreConfig::default());
}

#[test]
fn test_add_then_has() {
    let store = Store::new();
    let q = quad("s", "p", "o", Some("g"));
    assert!(store.add(&q));
    assert!(store.has(&q));
    assert_eq!(store.size(), 1);

    // second add is a no-op
    assert!(!store.add(&q));
    assert!(!store.add(&quad("s", "p", "o", Some("g"))));
    assert_eq!(store.size(), 1);
}

#[test]
fn test_same_triple_in_two_graphs() {
    let store = Store::new();
    let g1 = quad("s", "p", "o", Some("g1"));
    let g2 = quad("s", "p", "o", Some("g2"));
    assert!(store.add(&g1));
    assert!(store.add(&g2));
    assert_eq!(store.size(), 2);
    assert_eq!(
        store
            .match_quads(Some(&nn("s")), Some(&nn("p")), Some(&nn("o")), None)
            .count(),
        2
    );

    assert!(store.remove(&g1));
    assert_eq!(store.size(), 1);
    assert!(!store.has(&g1));
    assert!(store.has(&g2));
    assert_eq!(store.quads(), vec![g2]);
}

#[test]
fn test_remove_missing_quad() {
    let store = Store::new();
    let q = quad("s", "p", "o", None);
    assert!(!store.remove(&q));
    assert_eq!(store.size(), 0);

    store.add(&q);
    assert!(!store.remove(&quad("s", "p", "other", None)));
    assert_eq!(store.size(), 1);
    assert!(store.remove(&q));
    assert!(!store.remove(&q));
    assert_eq!(store.size(), 0);
}

#[test]
fn test_removed_quad_no_longer_matches() {
    let store = Store::new();
    let q = quad("s", "p", "o", None);
    store.add(&q);
    store.remove(&q);
    for pattern in [
        [Some(nn("s")), None, None, None],
        [None, Some(nn("p")), None, None],
        [None, None, Some(nn("o")), None],
        [None, None, None, Some(Term::DefaultGraph)],
        [None, None, None, None],
    ] {
        let stream = store.match_quads(
            pattern[0].as_ref(),
            pattern[1].as_ref(),
            pattern[2].as_ref(),
            pattern[3].as_ref(),
        );
        assert_eq!(stream.count(), 0);
    }
}

#[test]
fn test_patterns_are_not_stored() {
    let store = Store::new();
    let pattern = Quad::new(var("s"), nn("p"), nn("o"), None).unwrap();
    assert!(!store.add(&pattern));
    assert_eq!(store.size(), 0);
}

#[test]
fn test_add_terms_rejections() {
    let store = Store::new();
    assert!(!store.add_terms(None, Some(nn("p")), Some(nn("o")), None));
    assert!(!store.add_terms(Some(nn("s")), None, Some(nn("o")), None));
    assert!(!store.add_terms(Some(nn("s")), Some(nn("p")), None, None));
    assert!(!store.add_terms(
        Some(Literal::new_string("s", None).into()),
        Some(nn("p")),
        Some(nn("o")),
        None
    ));
    for variable_position in 0..4 {
        let mut terms = [Some(nn("s")), Some(nn("p")), Some(nn("o")), Some(nn("g"))];
        terms[variable_position] = Some(var("x"));
        let [s, p, o, g] = terms;
        assert!(!store.add_terms(s, p, o, g));
    }
    assert_eq!(store.size(), 0);
}

#[test]
fn test_add_terms_missing_graph_is_default_graph() {
    let store = Store::new();
    assert!(store.add_terms(Some(nn("s")), Some(nn("p")), Some(nn("o")), None));
    assert!(store.has(&Quad::new(nn("s"), nn("p"), nn("o"), Some(Term::DefaultGraph)).unwrap()));
    assert_eq!(
        store
            .match_quads(None, None, None, Some(&Term::DefaultGraph))
            .count(),
        1
    );
}

#[test]
fn test_match_table() {
    let store = match_fixture();
    let literal: Term = Literal::new("subject", None, Some(NamedNode::new(""))).into();
    let dg = Term::DefaultGraph;

    let cases: Vec<(&str, [Option<Term>; 4], usize)> = vec![
        ("all wildcards", [None, None, None, None], 8),
        ("all variables", [Some(var("a")), Some(var("b")), Some(var("c")), Some(var("d"))], 8),
        ("literal subject", [Some(literal.clone()), None, None, None], 0),
        (
            "impossible quad",
            [Some(dg.clone()), Some(dg.clone()), Some(dg.clone()), Some(literal)],
            0,
        ),
        ("unknown subject", [Some(nn("no_match")), None, None, None], 0),
        ("unknown predicate", [None, Some(nn("no_match")), None, None], 0),
        ("unknown object", [None, None, Some(nn("no_match")), None], 0),
        ("unknown graph", [None, None, None, Some(nn("no_match"))], 0),
        ("subject", [Some(nn("subject")), None, None, None], 2),
        ("subject1", [Some(nn("subject1")), None, None, None], 3),
        ("predicate", [None, Some(nn("predicate")), None, None], 6),
        ("predicate1", [None, Some(nn("predicate1")), None, None], 2),
        ("object", [None, None, Some(nn("object")), None], 6),
        ("graph", [None, None, None, Some(nn("graph"))], 5),
        ("graph1", [None, None, None, Some(nn("graph1"))], 2),
        ("default graph", [None, None, None, Some(dg.clone())], 1),
        ("subject1 predicate1", [Some(nn("subject1")), Some(nn("predicate1")), None, None], 2),
        ("subject1 predicate", [Some(nn("subject1")), Some(nn("predicate")), None, None], 1),
        (
            "triple in two graphs",
            [Some(nn("subject")), Some(nn("predicate")), Some(nn("object")), None],
            2,
        ),
        (
            "fully bound",
            [
                Some(nn("subject")),
                Some(nn("predicate")),
                Some(nn("object")),
                Some(nn("graph")),
            ],
            1,
        ),
        (
            "fully bound default graph",
            [
                Some(nn("subject")),
                Some(nn("predicate")),
                Some(nn("object")),
                Some(dg.clone()),
            ],
            1,
        ),
        (
            "fully bound absent",
            [
                Some(nn("subject2")),
                Some(nn("predicate")),
                Some(nn("object")),
                Some(dg),
            ],
            0,
        ),
        ("subject and object", [Some(nn("subject1")), None, Some(nn("object2")), None], 1),
        ("variable subject", [Some(var("s")), Some(nn("predicate1")), None, None], 2),
        ("object and graph", [None, None, Some(nn("object1")), Some(nn("graph1"))], 1),
        ("mismatched pair", [Some(nn("subject2")), Some(nn("predicate1")), None, None], 0),
    ];

    for (name, [s, p, o, g], expected) in cases {
        let found = store
            .match_quads(s.as_ref(), p.as_ref(), o.as_ref(), g.as_ref())
            .to_array();
        assert_eq!(found.len(), expected, "case {}", name);
        for q in &found {
            for (bound, actual) in [
                (&s, q.subject()),
                (&p, q.predicate()),
                (&o, q.object()),
                (&g, q.graph()),
            ] {
                if let Some(term) = bound {
                    assert!(term.is_variable() || term == actual, "case {}", name);
                }
            }
        }
    }
}

#[test]
fn test_match_all_returns_distinct_quads() {
    let store = match_fixture();
    let all = store.match_quads(None, None, None, None).to_array();
    assert_eq!(all.len(), store.size());
    let distinct: HashSet<_> = all.iter().collect();
    assert_eq!(distinct.len(), store.size());
}

#[test]
fn test_remove_matches() {
    let store = match_fixture();
    assert_eq!(store.remove_matches(Some(&nn("subject1")), None, None, None), 3);
    assert_eq!(store.size(), 5);
    assert_eq!(
        store
            .match_quads(Some(&nn("subject1")), None, None, None)
            .count(),
        0
    );
    assert_eq!(store.remove_matches(Some(&nn("subject1")), None, None, None), 0);
}

#[test]
fn test_delete_graph() {
    let store = match_fixture();
    assert_eq!(store.delete_graph(&nn("graph")), 5);
    assert_eq!(store.size(), 3);
    assert_eq!(store.delete_graph(&Term::DefaultGraph), 1);
    assert_eq!(store.size(), 2);
}

#[test]
fn test_delete_unknown_graph() {
    let store = Store::new();
    let q = quad("subject1", "predicate1", "object1", Some("graph1"));
    store.add(&q);
    assert_eq!(store.delete_graph(&nn("nonexistent_graph")), 0);
    assert_eq!(store.size(), 1);
    assert!(store.has(&q));
}

#[test]
fn test_remove_stream() {
    let store = match_fixture();
    let doomed = QuadStream::from_array([
        quad("subject", "predicate", "object", Some("graph")),
        quad("subject", "predicate", "object", None),
        quad("never", "added", "here", None),
    ]);
    assert_eq!(store.remove_stream(doomed), 2);
    assert_eq!(store.size(), 6);
}

#[test]
fn test_for_each_can_remove() {
    let store = Store::new();
    store.add(&quad("subject1", "predicate1", "object1", Some("graph1")));
    store.add(&quad("subject2", "predicate2", "object2", Some("graph2")));

    let mut visited = 0;
    store.for_each(|q| {
        visited += 1;
        store.remove(q);
    });
    assert_eq!(visited, 2);
    assert_eq!(store.size(), 0);
}

#[test]
fn test_for_each_skips_quads_removed_earlier() {
    let store = Store::new();
    for i in 0..10 {
        store.add(&quad(&format!("s{}", i), "p", "o", None));
    }
    let mut visited = 0;
    store.for_each(|_| {
        visited += 1;
        // removing everything on the first visit leaves nothing else to see
        store.remove_matches(None, None, None, None);
    });
    assert_eq!(visited, 1);
    assert!(store.is_empty());
}

#[test]
fn test_import_skips_holes_and_failed_quads() {
    let store = Store::new();
    let valid = quad("subject1", "predicate1", "object1", Some("graph1"));
    let faulty = Quad::new(
        Literal::new_string("subject", None),
        nn("predicate"),
        nn("object"),
        Some(nn("graph")),
    )
    .ok();
    assert!(faulty.is_none());

    let added = store.import(QuadStream::from_array([Some(valid.clone()), None, faulty]));
    assert_eq!(added, 1);
    assert_eq!(store.size(), 1);
    assert!(store.has(&valid));
}

#[test]
fn test_import_counts_only_new_quads() {
    let store = Store::new();
    let q = quad("s", "p", "o", None);
    let pattern = Quad::new(var("s"), nn("p"), nn("o"), None).unwrap();
    store.add(&q);
    let added = store.import(QuadStream::from_array([
        q.clone(),
        pattern,
        quad("s2", "p", "o", None),
    ]));
    assert_eq!(added, 1);
    assert_eq!(store.size(), 2);
}

#[test]
fn test_from_array_to_store_deduplicates() {
    let input = vec![
        quad("a", "p", "o", None),
        quad("b", "p", "o", None),
        quad("a", "p", "o", None),
        quad("a", "p", "o", Some("g")),
    ];
    let store = QuadStream::from_array(input.clone()).to_store();
    let expected: HashSet<_> = input.into_iter().collect();
    let actual: HashSet<_> = store
        .match_quads(None, None, None, None)
        .to_array()
        .into_iter()
        .collect();
    assert_eq!(store.size(), 3);
    assert_eq!(actual, expected);
}

#[test]
fn test_nested_quads_are_indexed() {
    let store = Store::new();
    let inner = quad("s", "p", "o", None);
    let outer = Quad::new(nn("alice"), nn("says"), inner.clone(), None).unwrap();
    store.add(&outer);
    let found = store
        .match_quads(None, None, Some(&Term::Quad(inner)), None)
        .to_array();
    assert_eq!(found, vec![outer]);
}

#[test]
fn test_remove_large_store() {
    let store = Store::new();
    let total = 10_000;
    for i in 0..total {
        store.add_terms(
            Some(nn(&format!("subject{}", i))),
            Some(nn("predicate")),
            Some(nn("object")),
            Some(nn("graph")),
        );
    }
    assert_eq!(store.size(), total);
    for i in 0..total {
        assert!(store.remove(&quad(&format!("subject{}", i), "predicate", "object", Some("graph"))));
    }
    assert_eq!(store.size(), 0);
}

#[test]
fn test_remove_matches_large_store() {
    let store = Store::new();
    for i in 0..1_000 {
        store.add(&quad(&format!("subject{}", i), "predicate", "object", Some("graph")));
    }
    assert_eq!(store.remove_matches(None, None, None, None), 1_000);
    assert_eq!(store.size(), 0);
}

#[test]
fn test_remove_stream_from_producer_thread() {
    let store = Store::new();
    let total = 10_000;
    for i in 0..total {
        store.add(&quad(&format!("subject{}", i), "predicate", "object", Some("graph")));
    }
    let stream = QuadStream::spawn(Capacity::Bounded(16), move |sender| {
        for i in 0..total {
            let q = quad(&format!("subject{}", i), "predicate", "object", Some("graph"));
            if sender.send(q).is_err() {
                return;
            }
        }
    });
    assert_eq!(store.remove_stream(stream), total);
    assert_eq!(store.size(), 0);
}

#[test]
fn test_clones_share_quads() {
    let store = Store::new();
    let handle = store.clone();
    handle.add(&quad("s", "p", "o", None));
    assert_eq!(store.size(), 1);
}

#[test]
fn test_with_config_unbounded_matches() {
    let config = StoreConfig::builder()
        .match_capacity(Capacity::Unbounded)
        .build()
        .unwrap();
    let store = Store::with_config(config);
    for i in 0..100 {
        store.add(&quad(&format!("s{}", i), "p", "o", None));
    }
    assert_eq!(store.config().match_capacity, Capacity::Unbounded);
    assert_eq!(store.match_quads(None, Some(&nn("p")), None, None).count(), 100);
}
