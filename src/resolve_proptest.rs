//! Property-based tests for tree building, merging and the eligibility
//! predicates.
//!
//! These tests use proptest to generate random declarations and environments
//! and verify that the resolution laws hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::env::{BuildMode, Emulator, Environment};
    use crate::error::Error;
    use crate::merge::{merge, PropertySet};
    use crate::overrides::Overrides;
    use crate::resolve::ResolvedProperties;
    use crate::schema::{Property, PropertyKind, PropertyValue, RunArg};
    use crate::tree::{Declaration, PropertyTree};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// A chain `d0/d1/.../dN` where level `i` carries `overrides[i]`.
    fn chain(overrides: Vec<Overrides>) -> (PropertyTree, Vec<String>) {
        let segments: Vec<String> = (0..overrides.len()).map(|i| format!("d{i}")).collect();
        let mut levels = overrides.into_iter().rev();
        let mut inner = levels.next().map(Declaration::leaf);
        for (depth, overrides) in levels.enumerate() {
            let segment = segments[segments.len() - 1 - depth].clone();
            let child = inner.take().map(|c| (segment, c));
            inner = Some(Declaration::branch(overrides, child));
        }
        let root = Declaration::branch(
            Overrides::new(),
            inner.map(|d| (segments.first().cloned().unwrap_or_default(), d)),
        );
        (PropertyTree::build(root).unwrap(), segments)
    }

    fn bool_properties() -> Vec<Property> {
        Property::ALL
            .into_iter()
            .filter(|p| p.kind() == PropertyKind::Bool)
            .collect()
    }

    fn arb_environment() -> impl Strategy<Value = Environment> {
        (
            prop::sample::select(vec!["x86_64", "arm", "aarch64"]),
            prop_oneof![Just(BuildMode::Userland), Just(BuildMode::Baremetal)],
            prop_oneof![Just(Emulator::Qemu), Just(Emulator::Gem5)],
            any::<bool>(),
        )
            .prop_map(|(arch, mode, emulator, package_all)| Environment {
                package_all,
                ..Environment::new(arch, mode, emulator)
            })
    }

    fn arb_resolved() -> impl Strategy<Value = ResolvedProperties> {
        let flags = bool_properties();
        (
            prop::collection::vec(any::<bool>(), flags.len()),
            prop::option::of(prop::sample::subsequence(vec!["x86_64", "arm", "aarch64"], 0..=3)),
            any::<bool>(),
            prop::sample::select(vec![
                "userland/c/hello.c",
                "userland/libs/libdrm/lib.c",
                "userland/arch/x86_64/add.S",
                "baremetal/arch/arm/main.cpp",
                "kernel_modules/README",
            ]),
        )
            .prop_map(move |(values, archs, signal, path)| {
                let mut overrides = Overrides::new();
                for (property, value) in flags.iter().zip(values) {
                    overrides.insert(*property, PropertyValue::Bool(value)).unwrap();
                }
                if let Some(archs) = archs {
                    overrides
                        .insert(Property::AllowedArchs, PropertyValue::archs(archs))
                        .unwrap();
                }
                if signal {
                    overrides
                        .insert(Property::SignalReceived, crate::signal::Signal::Abort.into())
                        .unwrap();
                }
                ResolvedProperties::new(
                    path.split('/'),
                    merge(&PropertySet::defaults(), &overrides),
                )
            })
    }

    proptest! {
        /// Property: any key outside the schema is rejected
        #[test]
        fn unknown_key_is_rejected(key in "[a-z_0-9]{1,24}") {
            prop_assume!(key.parse::<Property>().is_err());
            let result = Overrides::from_pairs([(key.as_str(), PropertyValue::Bool(true))]);
            let is_unknown = matches!(result, Err(Error::UnknownProperty { .. }));
            prop_assert!(is_unknown);
        }

        /// Property: a path the tree does not mention resolves to the defaults
        #[test]
        fn unmatched_path_resolves_to_defaults(
            segments in prop::collection::vec("[a-z]{1,8}", 0..6)
        ) {
            let (tree, _) = chain(vec![
                Overrides::new().with(Property::Baremetal, true).unwrap(),
            ]);
            // the chain only has `d0`, which the pattern cannot produce
            let resolved = tree.resolve_segments(segments.clone());
            prop_assert_eq!(resolved.properties(), &PropertySet::defaults());
            prop_assert_eq!(resolved.path(), segments.as_slice());
        }

        /// Property: list properties accumulate from the root down
        #[test]
        fn flags_accumulate_root_to_leaf(
            levels in prop::collection::vec(prop::collection::vec("-[a-z]{1,6}", 0..4), 1..6)
        ) {
            let overrides = levels
                .iter()
                .map(|flags| {
                    Overrides::new()
                        .with(Property::CcFlags, PropertyValue::flags(flags.clone()))
                        .unwrap()
                })
                .collect();
            let (tree, segments) = chain(overrides);

            let mut expected = PropertySet::defaults()
                .get(Property::CcFlags)
                .clone();
            if let PropertyValue::List(base) = &mut expected {
                base.extend(levels.iter().flatten().cloned());
            }
            let resolved = tree.resolve_segments(segments);
            prop_assert_eq!(resolved.get(Property::CcFlags), &expected);
        }

        /// Property: the deepest scalar wins, and a prefix sees only its own levels
        #[test]
        fn deepest_scalar_wins(statuses in prop::collection::vec(any::<i64>(), 1..8)) {
            let overrides = statuses
                .iter()
                .map(|s| Overrides::new().with(Property::ExitStatus, *s).unwrap())
                .collect();
            let (tree, segments) = chain(overrides);

            for depth in 1..=segments.len() {
                let resolved = tree.resolve_segments(segments[..depth].to_vec());
                prop_assert_eq!(resolved.exit_status(), statuses[depth - 1]);
            }
        }

        /// Property: test_run_args keeps parent keys and the child wins on shared ones
        #[test]
        fn run_args_child_wins(
            parent in prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..5),
            child in prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..5),
        ) {
            let (tree, segments) = chain(vec![
                Overrides::new()
                    .with(Property::TestRunArgs, PropertyValue::run_args(parent.clone()))
                    .unwrap(),
                Overrides::new()
                    .with(Property::TestRunArgs, PropertyValue::run_args(child.clone()))
                    .unwrap(),
            ]);

            let mut expected: BTreeMap<String, RunArg> =
                parent.into_iter().map(|(k, v)| (k, RunArg::from(v))).collect();
            expected.extend(child.into_iter().map(|(k, v)| (k, RunArg::from(v))));

            let resolved = tree.resolve_segments(segments);
            prop_assert_eq!(resolved.get(Property::TestRunArgs), &PropertyValue::Map(expected));
        }

        /// Property: anything that should be tested should also be built (without linking)
        #[test]
        fn tested_implies_built(resolved in arb_resolved(), env in arb_environment()) {
            if resolved.should_be_tested(&env) {
                prop_assert!(resolved.should_be_built(&env, false));
            }
        }

        /// Property: linking only ever removes paths from the build set
        #[test]
        fn linking_is_stricter(resolved in arb_resolved(), env in arb_environment()) {
            if resolved.should_be_built(&env, true) {
                prop_assert!(resolved.should_be_built(&env, false));
            }
        }

        /// Property: no_build excludes a path from building and testing everywhere
        #[test]
        fn no_build_dominates(resolved in arb_resolved(), env in arb_environment()) {
            let blocked = Overrides::new().with(Property::NoBuild, true).unwrap();
            let resolved = ResolvedProperties::new(
                resolved.path().to_vec(),
                merge(resolved.properties(), &blocked),
            );
            prop_assert!(!resolved.should_be_built(&env, false));
            prop_assert!(!resolved.should_be_built(&env, true));
            prop_assert!(!resolved.should_be_tested(&env));
        }
    }
}
