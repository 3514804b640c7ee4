// Randomized acquire/release interleavings must always end with an empty registry.
use proptest::prelude::*;
use shader_core::{HeadlessDriver, ProgramRegistry, ShaderProgram};
use std::fs;
use std::rc::Rc;

const TRIVIAL: &str = "#shader vertex\nvoid main(){}\n#shader fragment\nvoid main(){}\n";

#[derive(Debug, Clone)]
enum Op {
    Create(usize),
    Drop(usize),
    Clone(usize),
}

fn op_strategy(identities: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..identities).prop_map(Op::Create),
        any::<usize>().prop_map(Op::Drop),
        any::<usize>().prop_map(Op::Clone),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_registry_tracks_live_handles(ops in proptest::collection::vec(op_strategy(4), 0..60)) {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<String> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("S{i}.shader"));
                fs::write(&path, TRIVIAL).unwrap();
                path.to_string_lossy().into_owned()
            })
            .collect();

        let registry = Rc::new(ProgramRegistry::new(HeadlessDriver::new()));
        let mut handles: Vec<ShaderProgram<HeadlessDriver>> = Vec::new();

        for op in ops {
            match op {
                Op::Create(i) => handles.push(ShaderProgram::new(&registry, paths[i].clone()).unwrap()),
                Op::Drop(i) if !handles.is_empty() => {
                    let index = i % handles.len();
                    handles.swap_remove(index);
                }
                Op::Clone(i) if !handles.is_empty() => {
                    let copy = handles[i % handles.len()].clone();
                    handles.push(copy);
                }
                _ => {}
            }

            for path in &paths {
                let live = handles.iter().filter(|h| h.identity() == path.as_str()).count() as u32;
                let expected = if live == 0 { None } else { Some(live) };
                prop_assert_eq!(registry.ref_count(path), expected);
            }
            prop_assert_eq!(registry.driver().live_programs(), registry.len());
        }

        handles.clear();
        prop_assert!(registry.is_empty());
        prop_assert_eq!(registry.driver().live_programs(), 0);
        let stats = registry.driver().stats();
        prop_assert_eq!(stats.programs_created, stats.programs_deleted);
    }
}
