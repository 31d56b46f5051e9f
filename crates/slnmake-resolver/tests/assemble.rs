use std::path::{Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use slnmake_core::loader::{LoadError, MemoryLoader};
use slnmake_core::solution::parse_solution;
use slnmake_core::target::{Linkage, TargetType};
use slnmake_resolver::{assemble, assemble_with, AssembleOptions};
use slnmake_util::errors::{AssemblyError, ParseError};

const APP: &str = "{4F91E518-696F-40B9-BB75-1FFBFF0444F6}";
const CORE: &str = "{56975423-DE68-4F56-9D04-B57B6AB8F3C5}";
const PLUGIN: &str = "{0A1B2C3D-4E5F-4061-8273-94A5B6C7D8E9}";

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures/demo")
}

fn fixture_loader(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(demo_dir().join(path)).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Unreadable(e.to_string()),
    })
}

fn demo_solution() -> slnmake_core::solution::SolutionRecord {
    let text = std::fs::read_to_string(demo_dir().join("Demo.sln")).unwrap();
    parse_solution(&text).unwrap()
}

const TWO_PROJECTS: &str = r#"Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "A", "A\A.vcxproj", "{A}"
	ProjectSection(ProjectDependencies) = postProject
		{B} = {B}
	EndProjectSection
EndProject
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "B", "B\B.vcxproj", "{B}"
EndProject
"#;

const EXE: &str = r#"<PropertyGroup Condition="'$(Configuration)|$(Platform)'=='Debug|Win32'">
  <ConfigurationType>Application</ConfigurationType>
</PropertyGroup>
<ItemGroup>
  <ClCompile Include="main.cpp" />
</ItemGroup>"#;

const LIB: &str = r#"<PropertyGroup Condition="'$(Configuration)|$(Platform)'=='Debug|Win32'">
  <ConfigurationType>StaticLibrary</ConfigurationType>
</PropertyGroup>"#;

#[test]
fn test_assemble_demo_fixture() {
    let solution = demo_solution();
    let assembled = assemble(&solution, &fixture_loader).unwrap();

    let names: Vec<&str> = assembled.projects.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["App", "Core", "Plugin", "Docs"]);
    assert_eq!(assembled.projects[0].record.target_type, TargetType::Executable);
    assert_eq!(
        assembled.projects[2].record.target_type,
        TargetType::Library(Linkage::Shared)
    );
    assert!(assembled.excluded.is_empty());
}

#[test]
fn test_project_references_become_edges() {
    let assembled = assemble(&demo_solution(), &fixture_loader).unwrap();
    assert_eq!(assembled.solution.dependencies_of(PLUGIN), vec![CORE]);
    assert_eq!(assembled.solution.dependencies_of(APP), vec![CORE]);
    assert_eq!(assembled.graph().dependents_of(CORE), vec![APP, PLUGIN]);
}

#[test]
fn test_project_lookup_ignores_identifier_case() {
    let assembled = assemble(&demo_solution(), &fixture_loader).unwrap();
    let lower = CORE.to_ascii_lowercase();
    assert_eq!(assembled.project(&lower).map(|p| p.name()), Some("Core"));
    assert_eq!(
        assembled.project(&format!(" {APP} ")).map(|p| p.name()),
        Some("App")
    );
    assert!(assembled.project("{00000000-0000-0000-0000-000000000000}").is_none());
}

#[test]
fn test_build_order_puts_dependencies_first() {
    let assembled = assemble(&demo_solution(), &fixture_loader).unwrap();
    let order: Vec<&str> = assembled.build_order().iter().map(|p| p.name()).collect();
    assert_eq!(order, vec!["Core", "App", "Plugin", "Docs"]);
}

#[test]
fn test_dangling_dependency_is_rejected() {
    let text = r#"Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "A", "A\A.vcxproj", "{A}"
	ProjectSection(ProjectDependencies) = postProject
		{MISSING} = {MISSING}
	EndProjectSection
EndProject
"#;
    let solution = parse_solution(text).unwrap();
    let loader = MemoryLoader::new().with("A/A.vcxproj", EXE);
    match assemble(&solution, &loader).unwrap_err() {
        AssemblyError::DanglingReference { identifier, .. } => assert_eq!(identifier, "{MISSING}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_dangling_configuration_is_rejected_before_loading() {
    let text = r#"Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "A", "A\A.vcxproj", "{A}"
EndProject
Global
	GlobalSection(ProjectConfigurationPlatforms) = postSolution
		{GHOST}.Debug|Win32.ActiveCfg = Debug|Win32
	EndGlobalSection
EndGlobal
"#;
    let solution = parse_solution(text).unwrap();
    let loader = |_: &Path| -> Result<String, LoadError> { panic!("loader must not be called") };
    match assemble(&solution, &loader).unwrap_err() {
        AssemblyError::DanglingReference {
            identifier,
            context,
        } => {
            assert_eq!(identifier, "{GHOST}");
            assert_eq!(context, "ProjectConfigurationPlatforms");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_manifest_is_unresolved() {
    let solution = parse_solution(TWO_PROJECTS).unwrap();
    let loader = MemoryLoader::new().with("A/A.vcxproj", EXE);
    match assemble(&solution, &loader).unwrap_err() {
        AssemblyError::UnresolvedProject { name, path, reason } => {
            assert_eq!(name, "B");
            assert_eq!(path, "B/B.vcxproj");
            assert_eq!(reason, "not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_manifest_carries_parse_error() {
    let solution = parse_solution(TWO_PROJECTS).unwrap();
    let loader = MemoryLoader::new()
        .with("A/A.vcxproj", EXE)
        .with("B/B.vcxproj", "<ItemGroup>\n<ClCompile Include=\"x.cpp>\n");
    match assemble(&solution, &loader).unwrap_err() {
        AssemblyError::InvalidProject { name, source } => {
            assert_eq!(name, "B");
            assert!(matches!(source, ParseError::MalformedSourceEntry { line: 2, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_cycle_is_rejected() {
    let text = r#"Project("{T}") = "A", "A.vcxproj", "{A}"
	ProjectSection(ProjectDependencies) = postProject
		{B} = {B}
	EndProjectSection
EndProject
Project("{T}") = "B", "B.vcxproj", "{B}"
	ProjectSection(ProjectDependencies) = postProject
		{A} = {A}
	EndProjectSection
EndProject
"#;
    let solution = parse_solution(text).unwrap();
    let loader = MemoryLoader::new()
        .with("A.vcxproj", EXE)
        .with("B.vcxproj", LIB);
    match assemble(&solution, &loader).unwrap_err() {
        AssemblyError::DependencyCycle { projects } => {
            assert_eq!(projects, vec!["A", "B", "A"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_project_reference_is_dangling() {
    let text = r#"Project("{T}") = "A", "A.vcxproj", "{A}"
EndProject
"#;
    let with_ref = r#"<ItemGroup>
  <ProjectReference Include="..\X\X.vcxproj">
    <Project>{x}</Project>
  </ProjectReference>
</ItemGroup>"#;
    let solution = parse_solution(text).unwrap();
    let loader = MemoryLoader::new().with("A.vcxproj", with_ref);
    match assemble(&solution, &loader).unwrap_err() {
        AssemblyError::DanglingReference {
            identifier,
            context,
        } => {
            assert_eq!(identifier, "{X}");
            assert!(context.contains("'A'"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_excluded_projects_are_not_loaded() {
    let solution = parse_solution(TWO_PROJECTS).unwrap();
    let mut builder = GlobSetBuilder::new();
    builder.add(Glob::new("B").unwrap());
    let options = AssembleOptions {
        exclude: builder.build().unwrap(),
    };
    let loader = MemoryLoader::new().with("A/A.vcxproj", EXE);
    let assembled = assemble_with(&solution, &loader, &options).unwrap();
    assert_eq!(assembled.projects.len(), 1);
    assert_eq!(assembled.excluded, vec!["B"]);
    assert!(assembled.solution.dependencies.is_empty());
    assert!(assembled.solution.reference("{B}").is_none());
}

#[test]
fn test_assembly_preserves_declaration_order() {
    let solution = parse_solution(TWO_PROJECTS).unwrap();
    let loader = MemoryLoader::new()
        .with("A/A.vcxproj", EXE)
        .with("B/B.vcxproj", LIB);
    let assembled = assemble(&solution, &loader).unwrap();
    let ids: Vec<&str> = assembled.projects.iter().map(|p| p.identifier()).collect();
    assert_eq!(ids, vec!["{A}", "{B}"]);
    let order: Vec<&str> = assembled.build_order().iter().map(|p| p.name()).collect();
    assert_eq!(order, vec!["B", "A"]);
}
