use favro::config::{Constructor, Count, GrammarConfig};
use favro::generators as g;
use favro::names::{NameAllocator, NamedKind};
use favro::schema::{self, Primitive, Protocol, TypeNode};
use favro::stream::SchemaStream;
use favro::Session;
use std::collections::HashSet;

/// Every allocated name in `protocol`, in the order it appears.
fn defined_names(protocol: &Protocol) -> Vec<String> {
    let mut names = Vec::new();
    protocol.walk_types(|ty| {
        if let Some(name) = ty.defined_name() {
            names.push(name.to_string());
        }
    });
    names
}

fn suffix(name: &str) -> u64 {
    name.rsplit_once('_').unwrap().1.parse().unwrap()
}

#[test]
fn allocator_counts_each_kind_separately() {
    let mut names = NameAllocator::default();
    assert_eq!(names.next(NamedKind::Record), "Record_0");
    assert_eq!(names.next(NamedKind::Enum), "Enum_0");
    assert_eq!(names.next(NamedKind::Record), "Record_1");
    assert_eq!(names.next(NamedKind::Fixed), "Fixed_0");
    assert_eq!(names.peek(NamedKind::Record), 2);
    assert_eq!(names.peek(NamedKind::Enum), 1);
}

#[test]
fn lowercase_names() {
    let mut names = NameAllocator::new(favro::config::NameStyle::Lowercase);
    assert_eq!(names.next(NamedKind::Enum), "enum_0");
    assert_eq!(names.next(NamedKind::Fixed), "fixed_0");
}

#[test]
fn names_are_unique_and_gapless_across_a_run() {
    let stream = SchemaStream::new(Session::new().seed(3), Count::Exactly(50));

    let mut all = Vec::new();
    for protocol in stream {
        all.extend(defined_names(&protocol));
    }

    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), all.len(), "a name was issued twice");

    for kind in ["Record", "Enum", "Fixed"] {
        let mut suffixes: Vec<u64> = all
            .iter()
            .filter(|n| n.starts_with(&format!("{kind}_")))
            .map(|n| suffix(n))
            .collect();
        suffixes.sort_unstable();
        let expected: Vec<u64> = (0..suffixes.len() as u64).collect();
        assert_eq!(suffixes, expected, "{kind} names have gaps");
    }
}

#[test]
fn primitive_only_grammar_never_recurses() {
    let grammar = GrammarConfig::full().only(&[Constructor::Primitive]);
    let mut session = Session::new().grammar(grammar);

    for _ in 0..100 {
        match session.generate_type() {
            TypeNode::Primitive(p) => assert!(Primitive::ALL.contains(&p)),
            other => panic!("expected a primitive, got {other:?}"),
        }
    }

    let names = session.context().names();
    assert_eq!(names.peek(NamedKind::Record), 0);
    assert_eq!(names.peek(NamedKind::Enum), 0);
    assert_eq!(names.peek(NamedKind::Fixed), 0);
}

#[test]
fn empty_record_serialization() -> anyhow::Result<()> {
    let grammar = GrammarConfig::full()
        .only(&[Constructor::Record])
        .max_depth(Some(1));

    for seed in 0..1000 {
        let mut session = Session::new().seed(seed).grammar(grammar.clone());
        let ty = session.generate_type();
        let TypeNode::Record { fields, .. } = &ty else {
            panic!("expected a record, got {ty:?}");
        };
        if fields.is_empty() {
            assert_eq!(
                serde_json::to_string(&ty)?,
                r#"{"type":"record","name":"Record_0","fields":[]}"#
            );
            return Ok(());
        }
    }
    panic!("no seed produced an empty record");
}

#[test]
fn union_keeps_first_member_per_key() {
    let u = schema::union([
        TypeNode::Primitive(Primitive::String),
        TypeNode::Primitive(Primitive::String),
    ]);
    assert_eq!(serde_json::to_string(&u).unwrap(), r#"["string"]"#);

    let u = schema::union([
        TypeNode::Primitive(Primitive::Int),
        TypeNode::Primitive(Primitive::Null),
        TypeNode::Primitive(Primitive::Int),
    ]);
    assert_eq!(
        u,
        TypeNode::Union {
            members: vec![
                TypeNode::Primitive(Primitive::Int),
                TypeNode::Primitive(Primitive::Null),
            ]
        }
    );

    assert_eq!(schema::union([]), TypeNode::Union { members: vec![] });
}

#[test]
fn generated_unions_fixeds_and_enums_are_well_formed() {
    let stream = SchemaStream::new(Session::new().seed(11), Count::Exactly(100));
    let mut saw_union = false;
    let mut saw_fixed = false;

    for protocol in stream {
        protocol.walk_types(|ty| match ty {
            TypeNode::Union { members } => {
                saw_union = true;
                assert!(members.len() <= g::MAX_UNION_MEMBERS);
                let keys: HashSet<_> = members.iter().map(|m| m.identity_key()).collect();
                assert_eq!(keys.len(), members.len(), "duplicate union member in {members:?}");
                assert!(members.iter().all(|m| matches!(m, TypeNode::Primitive(_))));
            }
            TypeNode::Fixed { size, .. } => {
                saw_fixed = true;
                assert!(*size <= g::MAX_FIXED_SIZE);
            }
            TypeNode::Enum { symbols, .. } => {
                assert!(symbols.len() <= g::MAX_SYMBOLS);
                for (i, s) in symbols.iter().enumerate() {
                    assert_eq!(*s, g::symbol(i));
                }
            }
            TypeNode::Record { fields, .. } => {
                assert!(fields.len() <= g::MAX_FIELDS);
                for (i, f) in fields.iter().enumerate() {
                    assert_eq!(f.name, format!("f{i}"));
                }
            }
            _ => {}
        });
    }

    assert!(saw_union);
    assert!(saw_fixed);
}

#[test]
fn enum_symbols() {
    assert_eq!(g::symbol(0), "AAAA");
    assert_eq!(g::symbol(1), "BBBB");
    assert_eq!(g::symbol(4), "EEEE");
}

#[test]
fn max_depth_bounds_nesting() {
    for depth in [0, 1, 3] {
        let grammar = GrammarConfig::full().max_depth(Some(depth));
        let mut session = Session::new().seed(depth as u64).grammar(grammar);
        for _ in 0..200 {
            let ty = session.generate_type();
            assert!(ty.depth() <= depth, "{ty:?} is deeper than {depth}");
            if depth == 0 {
                assert!(matches!(ty, TypeNode::Primitive(_)), "{ty:?}");
            }
        }
    }
}

#[test]
fn params_and_responses_share_the_depth_limit() {
    let grammar = GrammarConfig::full()
        .only(&[Constructor::Array])
        .max_depth(Some(1));
    let session = Session::new().seed(17).grammar(grammar);

    let array_of_primitive = |ty: &TypeNode| match ty {
        TypeNode::Array { items } => matches!(**items, TypeNode::Primitive(_)),
        _ => false,
    };

    let mut params = 0;
    for protocol in SchemaStream::new(session, Count::Exactly(20)) {
        for (_, message) in &protocol.messages {
            for param in &message.request {
                params += 1;
                assert!(array_of_primitive(&param.ty), "{:?}", param.ty);
            }
            assert!(array_of_primitive(&message.response), "{:?}", message.response);
        }
    }
    assert!(params > 0);
}

#[test]
fn protocols_have_expected_shape() {
    let stream =
        SchemaStream::new(Session::new().seed(5), Count::Exactly(20)).start_time(1_700_000_000);

    for (i, protocol) in stream.enumerate() {
        assert_eq!(protocol.namespace, "favro");
        assert_eq!(protocol.protocol, format!("Favro1700000000_{i:08}"));
        assert!(protocol.types.is_empty());
        assert!(protocol.messages.len() <= 20);
        for (j, (name, message)) in protocol.messages.iter().enumerate() {
            assert_eq!(*name, format!("M{j}"));
            assert_eq!(protocol.message(name), Some(message));
            assert!(message.request.len() <= g::MAX_PARAMS);
            for (k, param) in message.request.iter().enumerate() {
                assert_eq!(param.name, format!("p{k}"));
            }
        }
    }
}

#[test]
fn simplified_grammar() {
    let grammar = GrammarConfig::simplified();
    assert_eq!(grammar.weight(Constructor::ArrayOfPrimitives), 1);

    let session = Session::new().seed(9).grammar(grammar);
    for protocol in SchemaStream::new(session, Count::Exactly(30)) {
        assert!(protocol.messages.len() <= 3);
        for (j, (name, _)) in protocol.messages.iter().enumerate() {
            assert_eq!(*name, format!("m{j}"));
        }
        for name in defined_names(&protocol) {
            assert!(name.starts_with(char::is_lowercase), "{name}");
        }
    }
}

#[test]
fn stream_yields_exactly_count() {
    assert_eq!(SchemaStream::new(Session::new(), Count::Exactly(0)).count(), 0);
    assert_eq!(SchemaStream::new(Session::new(), Count::Exactly(7)).count(), 7);
    assert_eq!(SchemaStream::new(Session::new(), Count::from(3)).count(), 3);
}

#[test]
fn stream_size_hint() {
    let stream = SchemaStream::new(Session::new(), Count::Exactly(7));
    assert_eq!(stream.size_hint(), (7, Some(7)));

    let stream = SchemaStream::new(Session::new(), Count::Unbounded);
    assert_eq!(stream.size_hint(), (usize::MAX, None));
}

#[cfg(target_pointer_width = "32")]
#[test]
fn stream_size_hint_beyond_usize() {
    let stream = SchemaStream::new(Session::new(), Count::Exactly(u64::MAX));
    assert_eq!(stream.size_hint(), (usize::MAX, None));
}

#[test]
fn unbounded_stream_keeps_going() {
    assert_eq!(Count::from(-1), Count::Unbounded);

    let mut stream = SchemaStream::new(Session::new(), Count::Unbounded).start_time(0);
    let last = stream.by_ref().take(250).last().unwrap();
    assert_eq!(last.protocol, "Favro0_00000249");
    assert_eq!(stream.next_name(), "Favro0_00000250");
    assert!(stream.next().is_some());
    assert!(stream.session().context().names().peek(NamedKind::Record) > 0);
}

#[test]
fn same_seed_same_protocols() {
    let a: Vec<_> = SchemaStream::new(Session::new().seed(77), Count::Exactly(5))
        .start_time(1)
        .collect();
    let b: Vec<_> = SchemaStream::new(Session::new().seed(77), Count::Exactly(5))
        .start_time(1)
        .collect();
    assert_eq!(a, b);
}

#[test]
fn hoisting_defines_types_before_use() {
    let grammar = GrammarConfig::full().hoist_named_types(true);
    let session = Session::new().seed(21).grammar(grammar);

    let mut hoisted_any = false;
    for protocol in SchemaStream::new(session, Count::Exactly(30)) {
        let mut defined = HashSet::new();
        for ty in &protocol.types {
            hoisted_any = true;
            ty.walk(&mut |node| {
                if let TypeNode::Reference(name) = node {
                    assert!(defined.contains(name), "{name} used before definition");
                }
            });
            assert!(defined.insert(ty.defined_name().unwrap().to_string()));
        }

        for (_, message) in &protocol.messages {
            let mut check = |node: &TypeNode| {
                assert!(node.defined_name().is_none(), "inline definition left behind");
                if let TypeNode::Reference(name) = node {
                    assert!(defined.contains(name));
                }
            };
            for param in &message.request {
                param.ty.walk(&mut check);
            }
            message.response.walk(&mut check);
        }
    }
    assert!(hoisted_any);
}
