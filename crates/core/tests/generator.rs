use std::collections::BTreeSet;
use xcbridge_api::{
    BuildGraphEntry, BuildLabel, CleanTargetRequest, GenerationRequest, GeneratorConfig,
    GlobalOptions, OptionKey, PathInfo, RuleType, SourcePath, SourceTree,
};
use xcbridge_core::generator::{
    CLEAN_TARGET_NAME, PathFilterSet, RuleMap, indexer_target_name,
};
use xcbridge_core::model::{BuildPhase, ProjectDocument, Target, TargetKind};
use xcbridge_core::{GenerationError, ProjectGenerator, generate};

const BAZEL: &str = "/path/to/bazel";

fn config() -> GeneratorConfig {
    GeneratorConfig::new("TestProject", BAZEL, "/work/space", "/work/space")
}

fn filters(entries: &[&str]) -> PathFilterSet {
    PathFilterSet::new(entries).unwrap()
}

fn setting<'a>(target: &'a Target, configuration: &str, key: &str) -> Option<&'a str> {
    target
        .configurations
        .get(configuration)
        .and_then(|s| s.get(key))
        .map(String::as_str)
}

fn phase_paths(doc: &ProjectDocument, target: &Target) -> Vec<String> {
    target
        .sources_phase()
        .unwrap_or_default()
        .iter()
        .map(|id| doc.file_tree().path_of(*id))
        .collect()
}

fn host_and_test(test_sources: &[&str]) -> Vec<BuildGraphEntry> {
    vec![
        BuildGraphEntry::new("test/app:TestApplication", RuleType::IOS_APPLICATION),
        BuildGraphEntry::new("test/app:TestTarget", RuleType::IOS_TEST)
            .with_attribute("xctest_app", "test/app:TestApplication")
            .with_sources(test_sources),
    ]
}

// --- Invocation targets ---

#[test]
fn test_invocation_target_settings() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![BuildGraphEntry::new(
        "test/app:TestApplication",
        RuleType::IOS_APPLICATION,
    )];
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();
    let doc = generator.finish().unwrap();

    assert_eq!(doc.target_count(), 1);
    let target = doc.target_by_name("TestApplication").unwrap();
    assert_eq!(target.kind, TargetKind::Invocation);
    assert_eq!(
        target.configurations.names().collect::<Vec<_>>(),
        ["Debug", "Release", "Fastbuild"]
    );
    for name in ["Debug", "Release", "Fastbuild"] {
        assert_eq!(
            setting(target, name, "BAZEL_TARGET"),
            Some("test/app:TestApplication")
        );
        assert_eq!(
            setting(target, name, "BAZEL_TARGET_IPA"),
            Some("test/app/TestApplication.ipa")
        );
        assert_eq!(setting(target, name, "BUILD_PATH"), Some("test/app"));
        assert_eq!(setting(target, name, "PRODUCT_NAME"), Some("TestApplication"));
    }

    assert_eq!(target.phases.len(), 1);
    let BuildPhase::ShellScript { script, .. } = &target.phases[0] else {
        panic!("expected a shell script phase, got {:?}", target.phases[0]);
    };
    assert!(script.contains(BAZEL));
    assert!(script.contains("test/app:TestApplication"));
    assert!(target.dependencies.is_empty());
}

#[test]
fn test_build_script_and_env_script_wrap_invocation() {
    let mut config = config();
    config.build_script_path = Some("/scripts/build.py".to_string());
    config.env_script_path = Some("/scripts/env.sh".to_string());
    let options = GlobalOptions::new();
    let generator = ProjectGenerator::new(&config, &options);
    let entry = BuildGraphEntry::new("//a:Lib", RuleType::OBJC_LIBRARY);

    let target = generator.make_invocation_target(&entry).unwrap();
    let BuildPhase::ShellScript { script, .. } = &target.phases[0] else {
        panic!("expected a shell script phase");
    };
    assert!(script.contains("source \"/scripts/env.sh\""));
    assert!(script.contains("/scripts/build.py"));
    assert!(script.contains("--bazel \"/path/to/bazel\""));
    assert!(script.contains("//a:Lib"));
    assert_eq!(setting(&target, "Debug", "BAZEL_TARGET_IPA"), None);
    assert_eq!(generator.document().target_count(), 0);
}

#[test]
fn test_target_scoped_options_fan_out_with_overrides() {
    let config = config();
    let mut options = GlobalOptions::new();
    options.set_project_value(OptionKey::OtherCFlags, "-DPROJECT");
    options.set_configuration_value(OptionKey::OtherCFlags, "Debug", "-DDEBUG_ONLY");
    options.set_project_value(OptionKey::SdkRoot, "iphoneos");
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![BuildGraphEntry::new("a:App", RuleType::IOS_APPLICATION)];
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();
    let doc = generator.finish().unwrap();

    let target = doc.target_by_name("App").unwrap();
    assert_eq!(setting(target, "Debug", "OTHER_CFLAGS"), Some("-DDEBUG_ONLY"));
    assert_eq!(setting(target, "Release", "OTHER_CFLAGS"), Some("-DPROJECT"));
    assert_eq!(setting(target, "Fastbuild", "OTHER_CFLAGS"), Some("-DPROJECT"));
    // Project-scoped options stay out of targets.
    assert_eq!(setting(target, "Debug", "SDKROOT"), None);
}

#[test]
fn test_missing_required_attribute() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![BuildGraphEntry::new("a:Ext", RuleType::IOS_EXTENSION)];

    let err = generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap_err();
    assert!(matches!(
        err,
        GenerationError::MissingRequiredAttribute {
            attribute: "binary",
            ..
        }
    ));
}

#[test]
fn test_required_attribute_with_default_is_not_required() {
    let config = config();
    let options = GlobalOptions::new();
    let generator = ProjectGenerator::new(&config, &options);
    let entry = BuildGraphEntry::new("a:Tests", RuleType::IOS_TEST);
    assert!(generator.make_invocation_target(&entry).is_ok());
}

#[test]
fn test_malformed_label() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![BuildGraphEntry::new("a:b:c", RuleType::IOS_APPLICATION)];

    let err = generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap_err();
    assert!(matches!(err, GenerationError::LabelParse(_)));
}

#[test]
fn test_naming_collision() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![
        BuildGraphEntry::new("a:App", RuleType::IOS_APPLICATION),
        BuildGraphEntry::new("b:App", RuleType::IOS_APPLICATION),
    ];

    let err = generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap_err();
    assert!(matches!(err, GenerationError::NamingCollision { ref name, .. } if name == "App"));
}

// --- Linkage ---

#[test]
fn test_linkage_without_sources() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator
        .generate_build_targets(&host_and_test(&[]), &filters(&[]))
        .unwrap();
    let doc = generator.finish().unwrap();

    let host_id = doc.target_id("TestApplication").unwrap();
    let host = doc.target(host_id);
    let test = doc.target_by_name("TestTarget").unwrap();

    for name in ["Debug", "Release", "Fastbuild"] {
        assert_eq!(setting(test, name, "BUNDLE_LOADER"), Some("$(TEST_HOST)"));
        assert_eq!(
            setting(test, name, "TEST_HOST"),
            Some("$(BUILT_PRODUCTS_DIR)/TestApplication.app/TestApplication")
        );
    }
    assert!(test.depends_on(host_id));
    assert_eq!(test.dependencies.len(), 1);
    assert_eq!(test.phases.len(), 1);
    assert_eq!(host.configurations.len(), 3);
    assert_eq!(test.configurations.len(), 3);
    assert!(doc.configurations().is_empty());
}

#[test]
fn test_linkage_with_sources() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator
        .generate_build_targets(
            &host_and_test(&["test/src/Tests.m", "elsewhere/Skipped.m"]),
            &filters(&["test/src"]),
        )
        .unwrap();
    let doc = generator.finish().unwrap();

    let host = doc.target_by_name("TestApplication").unwrap();
    let test = doc.target_by_name("TestTarget").unwrap();

    assert_eq!(test.phases.len(), 2);
    assert!(test.phases[0].is_sources());
    assert!(test.phases[1].is_shell_script());
    assert_eq!(phase_paths(&doc, test), ["test/src/Tests.m"]);
    assert!(doc.file_tree().find_reference("elsewhere/Skipped.m").is_none());

    for target in [host, test] {
        assert_eq!(target.configurations.len(), 5);
        for runner in ["__TestRunner_Debug", "__TestRunner_Release"] {
            assert_eq!(setting(target, runner, "DEBUG_INFORMATION_FORMAT"), Some("dwarf"));
            assert_eq!(setting(target, runner, "ONLY_ACTIVE_ARCH"), Some("YES"));
            assert_eq!(setting(target, runner, "OTHER_CFLAGS"), Some("-help"));
            assert_eq!(setting(target, runner, "OTHER_LDFLAGS"), Some("-help"));
        }
    }
    // Runner configurations copy their base configuration.
    assert_eq!(
        setting(test, "__TestRunner_Debug", "TEST_HOST"),
        setting(test, "Debug", "TEST_HOST")
    );
    assert_eq!(
        setting(host, "__TestRunner_Release", "PRODUCT_NAME"),
        Some("TestApplication")
    );
    assert_eq!(doc.configurations().len(), 4);
}

#[test]
fn test_linkage_with_filtered_out_sources_adds_no_runner() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator
        .generate_build_targets(&host_and_test(&["test/src/Tests.m"]), &filters(&["other"]))
        .unwrap();
    let doc = generator.finish().unwrap();

    let host = doc.target_by_name("TestApplication").unwrap();
    let test = doc.target_by_name("TestTarget").unwrap();
    assert_eq!(test.phases.len(), 1);
    assert_eq!(host.configurations.len(), 3);
    assert!(doc.file_tree().has_no_references());
}

#[test]
fn test_unresolved_host_is_a_no_op() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![
        BuildGraphEntry::new("test/app:TestTarget", RuleType::IOS_TEST)
            .with_attribute("xctest_app", "test/app:Missing")
            .with_sources(&["test/src/Tests.m"]),
    ];
    generator
        .generate_build_targets(&entries, &filters(&["test/src"]))
        .unwrap();
    let doc = generator.finish().unwrap();

    let test = doc.target_by_name("TestTarget").unwrap();
    assert!(test.dependencies.is_empty());
    assert_eq!(setting(test, "Debug", "TEST_HOST"), None);
    assert_eq!(test.phases.len(), 1);
}

#[test]
fn test_host_in_earlier_batch_is_not_linked() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let mut entries = host_and_test(&[]);
    let test = entries.pop().unwrap();
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();
    generator
        .generate_build_targets(&[test], &filters(&[]))
        .unwrap();
    let doc = generator.finish().unwrap();

    assert!(doc.target_by_name("TestTarget").unwrap().dependencies.is_empty());
}

#[test]
fn test_logic_test_does_not_link() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let mut entries = host_and_test(&[]);
    entries[1] = entries[1].clone().with_attribute("xctest", "0");
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();
    let doc = generator.finish().unwrap();

    let test = doc.target_by_name("TestTarget").unwrap();
    assert!(test.dependencies.is_empty());
    assert_eq!(setting(test, "Debug", "BUNDLE_LOADER"), None);
}

#[test]
fn test_host_label_forms_are_equivalent() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![
        BuildGraphEntry::new("//test/app:TestApplication", RuleType::IOS_APPLICATION),
        BuildGraphEntry::new("test/app:TestTarget", RuleType::IOS_TEST)
            .with_attribute("xctest_app", "test/app:TestApplication"),
    ];
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();
    let doc = generator.finish().unwrap();

    let host = doc.target_id("TestApplication").unwrap();
    assert!(doc.target_by_name("TestTarget").unwrap().depends_on(host));
}

#[test]
fn test_mutual_hosts_form_a_cycle() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![
        BuildGraphEntry::new("a:First", RuleType::IOS_TEST).with_attribute("xctest_app", "a:Second"),
        BuildGraphEntry::new("a:Second", RuleType::IOS_TEST).with_attribute("xctest_app", "a:First"),
    ];
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();

    let err = generator.finish().unwrap_err();
    assert!(matches!(err, GenerationError::DependencyCycle(_)));
}

// --- Clean target ---

fn assert_clean_wiring(doc: &ProjectDocument) {
    let clean = doc.target_id(CLEAN_TARGET_NAME).unwrap();
    assert!(doc.target(clean).dependencies.is_empty());
    for id in doc.target_ids().filter(|id| *id != clean) {
        let target = doc.target(id);
        assert_eq!(target.dependencies.len(), 1, "{}", target.name);
        assert!(target.depends_on(clean));
    }
}

#[test]
fn test_clean_target_applies_to_targets_added_before() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let entries = vec![
        BuildGraphEntry::new("a:App", RuleType::IOS_APPLICATION),
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY),
    ];
    generator
        .generate_build_targets(&entries, &filters(&[]))
        .unwrap();
    generator
        .generate_clean_target("scriptPath", Some("/work/space"))
        .unwrap();
    let doc = generator.finish().unwrap();

    assert_eq!(doc.target_count(), 3);
    assert_clean_wiring(&doc);

    let clean = doc.target_by_name(CLEAN_TARGET_NAME).unwrap();
    assert_eq!(clean.kind, TargetKind::Utility);
    assert_eq!(
        clean.phases,
        [BuildPhase::ExternalTool {
            tool_path: "scriptPath".to_string(),
            arguments: format!("\"{}\"", BAZEL),
            working_directory: Some("/work/space".to_string()),
            pass_build_settings_in_environment: true,
        }]
    );
}

#[test]
fn test_clean_target_applies_to_targets_added_after() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator.generate_clean_target("scriptPath", None).unwrap();

    let entries = vec![
        BuildGraphEntry::new("a:App", RuleType::IOS_APPLICATION),
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY).with_sources(&["a/lib.m"]),
    ];
    generator
        .generate_build_targets(&entries, &filters(&["a"]))
        .unwrap();
    let rule_map = RuleMap::new();
    generator
        .generate_indexer_target(&entries[1], &rule_map, &filters(&["a"]))
        .unwrap();

    // Wired as soon as the targets exist, not only at finish.
    let clean = generator.document().target_id(CLEAN_TARGET_NAME).unwrap();
    assert!(generator.document().target_by_name("App").unwrap().depends_on(clean));

    let doc = generator.finish().unwrap();
    assert_eq!(doc.target_count(), 4);
    assert_clean_wiring(&doc);
}

#[test]
fn test_second_clean_target_is_rejected() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator.generate_clean_target("scriptPath", None).unwrap();

    let err = generator
        .generate_clean_target("scriptPath", None)
        .unwrap_err();
    assert!(matches!(err, GenerationError::NamingCollision { .. }));
}

// --- Document-level configurations ---

#[test]
fn test_top_level_configurations() {
    let config = config();
    let options = GlobalOptions::new().with_project_value(OptionKey::SdkRoot, "iphoneos");
    let mut generator = ProjectGenerator::new(&config, &options);
    generator.generate_top_level_build_configurations(&BTreeSet::new());
    let doc = generator.finish().unwrap();

    let configurations = doc.configurations();
    assert_eq!(
        configurations.names().collect::<Vec<_>>(),
        ["Debug", "Release", "Fastbuild"]
    );
    for (_, settings) in configurations.iter() {
        let expected = [
            ("ALWAYS_SEARCH_USER_PATHS", "NO"),
            ("CODE_SIGN_IDENTITY", ""),
            ("CODE_SIGNING_REQUIRED", "NO"),
            ("ENABLE_TESTABILITY", "YES"),
            ("HEADER_SEARCH_PATHS", "$(SRCROOT)"),
            ("IPHONEOS_DEPLOYMENT_TARGET", "8.4"),
            ("ONLY_ACTIVE_ARCH", "YES"),
            ("SDKROOT", "iphoneos"),
        ];
        assert_eq!(settings.len(), expected.len());
        for (key, value) in expected {
            assert_eq!(settings.get(key).map(String::as_str), Some(value), "{}", key);
        }
    }
}

#[test]
fn test_top_level_configurations_with_include_paths() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let includes: BTreeSet<String> = ["include/paths", "additional"]
        .into_iter()
        .map(String::from)
        .collect();
    generator.generate_top_level_build_configurations(&includes);
    let doc = generator.finish().unwrap();

    let debug = doc.configurations().get("Debug").unwrap();
    assert_eq!(
        debug["HEADER_SEARCH_PATHS"],
        "$(SRCROOT) $(SRCROOT)/additional $(SRCROOT)/include/paths"
    );
    assert!(!debug.contains_key("SDKROOT"));
}

#[test]
fn test_header_search_paths_follow_root_offset() {
    let config = GeneratorConfig::new("P", BAZEL, "/work/space/out", "/work/space");
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator.generate_top_level_build_configurations(&BTreeSet::new());
    let doc = generator.finish().unwrap();

    assert_eq!(
        doc.configurations().get("Release").unwrap()["HEADER_SEARCH_PATHS"],
        "$(SRCROOT)/.."
    );
}

// --- Indexers ---

fn index_one(entry: BuildGraphEntry, filter_entries: &[&str]) -> ProjectDocument {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator
        .generate_indexer_target(&entry, &RuleMap::new(), &filters(filter_entries))
        .unwrap();
    generator.finish().unwrap()
}

fn only_indexer(doc: &ProjectDocument) -> &Target {
    assert_eq!(doc.target_count(), 1);
    let target = &doc.targets()[0];
    assert_eq!(target.kind, TargetKind::Indexer);
    target
}

#[test]
fn test_indexer_name_and_product_name() {
    let label = "test/app:TestApplication";
    let doc = index_one(
        BuildGraphEntry::new(label, RuleType::OBJC_LIBRARY).with_sources(&["test/app/a.m"]),
        &["test/app"],
    );

    let target = only_indexer(&doc);
    let expected = indexer_target_name(&BuildLabel::new(label)).unwrap();
    assert!(expected.starts_with("_indexer_TestApplication_"));
    assert_eq!(target.name, expected);
    for name in ["Debug", "Release", "Fastbuild"] {
        assert_eq!(setting(target, name, "PRODUCT_NAME"), Some(expected.as_str()));
    }
    assert_eq!(target.configurations.get("Debug").unwrap().len(), 1);
    assert_eq!(target.phases.len(), 1);
}

#[test]
fn test_indexer_with_pch() {
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY)
            .with_sources(&["a/lib.m"])
            .with_attribute("pch", PathInfo::source("a/pch.pch")),
        &["a"],
    );

    let target = only_indexer(&doc);
    assert_eq!(setting(target, "Debug", "GCC_PREFIX_HEADER"), Some("$(SRCROOT)/a/pch.pch"));
    assert_eq!(phase_paths(&doc, target), ["a/lib.m"]);
    assert!(doc.file_tree().find_reference("a/pch.pch").is_none());
}

#[test]
fn test_indexer_with_bridging_header() {
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::SWIFT_LIBRARY)
            .with_sources(&["a/lib.swift"])
            .with_attribute("bridging_header", PathInfo::source("a/bridging-header.h")),
        &["a"],
    );

    let target = only_indexer(&doc);
    assert_eq!(
        setting(target, "Release", "SWIFT_OBJC_BRIDGING_HEADER"),
        Some("$(SRCROOT)/a/bridging-header.h")
    );
}

#[test]
fn test_indexer_with_generated_bridging_header() {
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::SWIFT_LIBRARY).with_attribute(
            "bridging_header",
            PathInfo::generated("some/place/bridging-header.h", "bazel-out/genfiles"),
        ),
        &["a"],
    );

    let target = only_indexer(&doc);
    assert_eq!(
        setting(target, "Fastbuild", "SWIFT_OBJC_BRIDGING_HEADER"),
        Some("bazel-genfiles/some/place/bridging-header.h")
    );
    assert_eq!(target.sources_phase(), Some(&[][..]));
}

#[test]
fn test_indexer_with_datamodels() {
    let models = xcbridge_api::AttributeValue::List(vec![
        PathInfo::source("a/Model.xcdatamodeld/v1.xcdatamodel").into(),
        PathInfo::source("a/Model.xcdatamodeld/v2.xcdatamodel").into(),
        PathInfo::generated("gen/Other.xcdatamodeld/v1.xcdatamodel", "bazel-out").into(),
    ]);
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY)
            .with_sources(&["a/lib.m"])
            .with_attribute("datamodels", models),
        &["a"],
    );

    let target = only_indexer(&doc);
    assert_eq!(
        phase_paths(&doc, target),
        ["a/lib.m", "a/Model.xcdatamodeld", "gen/Other.xcdatamodeld"]
    );
    let generated = doc.file_tree().find_reference("gen/Other.xcdatamodeld").unwrap();
    assert_eq!(doc.file_tree().origin_of_node(generated), SourceTree::BuildOutput);
}

#[test]
fn test_indexer_exact_filter() {
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY).with_sources(&[
            "a/top.m",
            "a/b/nested.m",
            "a/b/c/deeper.m",
            "root.m",
        ]),
        &["a/b"],
    );

    assert_eq!(phase_paths(&doc, only_indexer(&doc)), ["a/b/nested.m"]);
    assert!(doc.file_tree().find_reference("a/top.m").is_none());
    assert!(doc.file_tree().find_reference("a/b/c/deeper.m").is_none());
}

#[test]
fn test_indexer_recursive_filter() {
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY).with_sources(&[
            "a/top.m",
            "a/b/nested.m",
            "a/b/c/deeper.m",
            "ab/sibling.m",
        ]),
        &["a/b/..."],
    );

    assert_eq!(
        phase_paths(&doc, only_indexer(&doc)),
        ["a/b/nested.m", "a/b/c/deeper.m"]
    );
}

#[test]
fn test_indexer_empty_filter_matches_root_files_only() {
    let doc = index_one(
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY)
            .with_sources(&["root.m", "a/nested.m"]),
        &[""],
    );

    assert_eq!(phase_paths(&doc, only_indexer(&doc)), ["root.m"]);
}

#[test]
fn test_indexer_without_content_is_skipped() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator.generate_top_level_build_configurations(&BTreeSet::new());
    let entries = vec![BuildGraphEntry::new("a:App", RuleType::IOS_APPLICATION)];
    generator
        .generate_build_targets(&entries, &filters(&["a"]))
        .unwrap();

    let entry =
        BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY).with_sources(&["elsewhere/x.m"]);
    let result = generator
        .generate_indexer_target(&entry, &RuleMap::new(), &filters(&["a"]))
        .unwrap();
    assert!(result.is_none());

    let doc = generator.finish().unwrap();
    assert_eq!(doc.target_count(), 1);
    assert_eq!(doc.configurations().len(), 3);
    assert!(doc.file_tree().has_no_references());
}

#[test]
fn test_indexer_follows_dependencies_once() {
    let app = BuildGraphEntry::new("a:App", RuleType::IOS_APPLICATION)
        .with_sources(&["a/main.m"])
        .with_dependencies(&["a:Lib", "b:Util", "c:Unknown"]);
    let lib = BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY)
        .with_sources(&["a/lib.m"])
        .with_dependencies(&["b:Util"]);
    let util = BuildGraphEntry::new("b:Util", RuleType::OBJC_LIBRARY).with_sources(&["b/util.m"]);
    let rule_map = RuleMap::from_entries([&lib, &util]).unwrap();

    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let set = filters(&["a", "b"]);
    let first = generator
        .generate_indexer_target(&app, &rule_map, &set)
        .unwrap();
    assert_eq!(generator.document().target_count(), 3);

    let again = generator
        .generate_indexer_target(&app, &rule_map, &set)
        .unwrap();
    let lib_again = generator
        .generate_indexer_target(&lib, &rule_map, &set)
        .unwrap();
    assert_eq!(first, again);
    assert!(lib_again.is_some());

    let doc = generator.finish().unwrap();
    assert_eq!(doc.target_count(), 3);
    // Shared file nodes are not duplicated.
    assert_eq!(doc.file_tree().references().len(), 3);
}

#[test]
fn test_build_file_references_respect_filter() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    let set = filters(&["a"]);
    let included = BuildGraphEntry::new("a:Lib", RuleType::OBJC_LIBRARY)
        .with_sources(&["a/lib.m"])
        .with_build_file("a/BUILD");
    let excluded = BuildGraphEntry::new("b:Lib2", RuleType::OBJC_LIBRARY)
        .with_sources(&["a/lib2.m"])
        .with_build_file("b/BUILD");
    generator
        .generate_indexer_target(&included, &RuleMap::new(), &set)
        .unwrap();
    generator
        .generate_indexer_target(&excluded, &RuleMap::new(), &set)
        .unwrap();
    let doc = generator.finish().unwrap();

    let build = doc.file_tree().find_reference("a/BUILD").unwrap();
    assert_eq!(doc.file_tree().origin_of_node(build), SourceTree::Group);
    assert!(doc.file_tree().find_reference("b/BUILD").is_none());
    for target in doc.targets() {
        assert!(!phase_paths(&doc, target).iter().any(|p| p.ends_with("BUILD")));
    }
}

#[test]
fn test_generate_file_references() {
    let config = config();
    let options = GlobalOptions::new();
    let mut generator = ProjectGenerator::new(&config, &options);
    generator
        .generate_file_references(["a/BUILD", "b/c/BUILD", "a/BUILD"])
        .unwrap();
    let doc = generator.finish().unwrap();

    assert_eq!(doc.file_tree().references().len(), 2);
    assert_eq!(doc.target_count(), 0);
}

// --- One-shot pass ---

fn request() -> GenerationRequest {
    let mut request = GenerationRequest::new(config());
    request.rules = vec![
        BuildGraphEntry::new("app:App", RuleType::IOS_APPLICATION)
            .with_sources(&["app/main.m"])
            .with_dependencies(&["lib:Lib"])
            .with_build_file("app/BUILD"),
        BuildGraphEntry::new("lib:Lib", RuleType::OBJC_LIBRARY)
            .with_sources(&["lib/lib.m", "lib/internal/impl.m"])
            .with_build_file("lib/BUILD"),
        BuildGraphEntry::new("app:Tests", RuleType::IOS_TEST)
            .with_attribute("xctest_app", "app:App")
            .with_sources(&["app/tests/Tests.m"]),
    ];
    request.path_filters = ["app/...".to_string()].into_iter().collect();
    request.source_paths = vec![SourcePath::new("lib", true, false)];
    request.clean_target = Some(CleanTargetRequest {
        script_path: "/scripts/clean.sh".to_string(),
        working_directory: None,
    });
    request
}

#[test]
fn test_generate_full_pass() {
    let doc = generate(&request(), &GlobalOptions::new()).unwrap();

    assert_eq!(doc.name, "TestProject");
    // Lib is consumed by App, so it only gets an indexer.
    assert!(doc.target_by_name("App").is_some());
    assert!(doc.target_by_name("Tests").is_some());
    assert!(doc.target_by_name("Lib").is_none());

    let lib_indexer = indexer_target_name(&BuildLabel::new("lib:Lib")).unwrap();
    let lib = doc.target_by_name(&lib_indexer).unwrap();
    assert_eq!(phase_paths(&doc, lib), ["lib/lib.m"]);
    assert!(
        doc.target_by_name(&indexer_target_name(&BuildLabel::new("app:App")).unwrap())
            .is_some()
    );

    let tests = doc.target_by_name("Tests").unwrap();
    assert!(tests.phases[0].is_sources());
    assert_eq!(tests.configurations.len(), 5);

    assert!(doc.file_tree().find_reference("app/BUILD").is_some());
    assert!(doc.file_tree().find_reference("lib/BUILD").is_some());
    assert_clean_wiring_except_host_edges(&doc);
    assert_eq!(doc.configurations().len(), 5);
}

fn assert_clean_wiring_except_host_edges(doc: &ProjectDocument) {
    let clean = doc.target_id(CLEAN_TARGET_NAME).unwrap();
    for id in doc.target_ids().filter(|id| *id != clean) {
        assert!(doc.target(id).depends_on(clean), "{}", doc.target(id).name);
    }
}

#[test]
fn test_dependency_labels_match_across_forms() {
    let mut request = GenerationRequest::new(config());
    request.rules = vec![
        BuildGraphEntry::new("//app:App", RuleType::IOS_APPLICATION)
            .with_sources(&["app/main.m"])
            .with_dependencies(&["lib:Lib"]),
        BuildGraphEntry::new("//lib:Lib", RuleType::OBJC_LIBRARY).with_sources(&["lib/lib.m"]),
    ];
    request.path_filters = ["app".to_string(), "lib".to_string()].into_iter().collect();

    let doc = generate(&request, &GlobalOptions::new()).unwrap();

    assert!(doc.target_by_name("App").is_some());
    assert!(doc.target_by_name("Lib").is_none());
    let lib_indexer = indexer_target_name(&BuildLabel::new("lib:Lib")).unwrap();
    assert_eq!(
        lib_indexer,
        indexer_target_name(&BuildLabel::new("//lib:Lib")).unwrap()
    );
    let lib = doc.target_by_name(&lib_indexer).unwrap();
    assert_eq!(phase_paths(&doc, lib), ["lib/lib.m"]);
}

#[test]
fn test_generate_is_deterministic() {
    let first = serde_json::to_string(&generate(&request(), &GlobalOptions::new()).unwrap()).unwrap();
    let second =
        serde_json::to_string(&generate(&request(), &GlobalOptions::new()).unwrap()).unwrap();
    assert_eq!(first, second);

    let json: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(json["name"], "TestProject");
    assert!(json["targets"].as_array().unwrap().len() >= 4);
}

#[test]
fn test_generate_fails_atomically() {
    let mut request = request();
    request
        .rules
        .push(BuildGraphEntry::new("other:App", RuleType::IOS_APPLICATION));

    let err = generate(&request, &GlobalOptions::new()).unwrap_err();
    assert!(matches!(err, GenerationError::NamingCollision { .. }));
}

#[test]
fn test_generate_rejects_invalid_filter() {
    let mut request = request();
    request.path_filters.insert("/absolute".to_string());

    let err = generate(&request, &GlobalOptions::new()).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidPathFilter { .. }));
}
