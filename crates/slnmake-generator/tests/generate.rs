use std::path::{Path, PathBuf};

use slnmake_core::loader::{LoadError, MemoryLoader};
use slnmake_core::solution::parse_solution;
use slnmake_core::target::Linkage;
use slnmake_generator::{generate, render_cmake, GenerationWarning, RenderOptions, StatementKind};
use slnmake_resolver::{assemble, AssembledSolution};
use slnmake_util::errors::AssemblyError;

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests/fixtures/demo")
}

fn demo() -> AssembledSolution {
    let text = std::fs::read_to_string(demo_dir().join("Demo.sln")).unwrap();
    let solution = parse_solution(&text).unwrap();
    let loader = |path: &Path| -> Result<String, LoadError> {
        std::fs::read_to_string(demo_dir().join(path)).map_err(|_| LoadError::NotFound)
    };
    assemble(&solution, &loader).unwrap()
}

fn single(manifest_path: &str, project: &str) -> AssembledSolution {
    let sln = format!(
        "Project(\"{{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}}\") = \"NAME\", \"{manifest_path}\", \"{{ID}}\"\nEndProject\n"
    );
    let solution = parse_solution(&sln).unwrap();
    let loader = MemoryLoader::new().with(manifest_path.replace('\\', "/"), project);
    assemble(&solution, &loader).unwrap()
}

const EXE_AB: &str = r#"<PropertyGroup Condition="'$(Configuration)|$(Platform)'=='Debug|Win32'">
  <ConfigurationType>Application</ConfigurationType>
</PropertyGroup>
<ItemGroup>
  <ClCompile Include="a.cpp" />
  <ClCompile Include="b.cpp" />
</ItemGroup>"#;

#[test]
fn test_executable_statement() {
    let description = generate(&single("NAME.vcxproj", EXE_AB));
    assert_eq!(description.to_directives(), "add_executable(NAME a.cpp b.cpp)");
    assert!(description.warnings.is_empty());
}

#[test]
fn test_sources_prefixed_with_project_directory() {
    let description = generate(&single(r"src\NAME\NAME.vcxproj", EXE_AB));
    assert_eq!(
        description.to_directives(),
        "add_executable(NAME src/NAME/a.cpp src/NAME/b.cpp)"
    );
}

#[test]
fn test_demo_statements_follow_declaration_order() {
    let description = generate(&demo());
    let names: Vec<&str> = description.statements.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["App", "Core", "Plugin"]);
    assert_eq!(description.statements[1].kind, StatementKind::Library(Linkage::Static));
    assert_eq!(
        description.to_directives(),
        [
            "add_executable(App App/main.cpp App/cli/args.cpp)",
            r#"add_library(Core STATIC Core/src/core.cpp "Core/src/math utils.cpp")"#,
            "add_library(Plugin SHARED Plugin/plugin.cpp)",
        ]
        .join("\n")
    );
}

#[test]
fn test_unknown_target_type_is_skipped_with_warning() {
    let description = generate(&demo());
    assert!(description.statements.iter().all(|s| s.name != "Docs"));
    assert_eq!(
        description.warnings,
        vec![GenerationWarning::UnknownTargetType {
            project: "Docs".to_string()
        }]
    );
}

#[test]
fn test_dangling_reference_produces_no_description() {
    let text = r#"Project("{T}") = "A", "A.vcxproj", "{A}"
	ProjectSection(ProjectDependencies) = postProject
		{B} = {B}
	EndProjectSection
EndProject
"#;
    let solution = parse_solution(text).unwrap();
    let loader = MemoryLoader::new().with("A.vcxproj", EXE_AB);
    assert!(matches!(
        assemble(&solution, &loader),
        Err(AssemblyError::DanglingReference { .. })
    ));
}

#[test]
fn test_render_demo() {
    let rendered = render_cmake(&demo(), &RenderOptions::default());
    let text = &rendered.text;
    assert!(text.starts_with("cmake_minimum_required(VERSION 3.16)\nproject(App LANGUAGES CXX)\n"));
    assert!(text.contains("add_executable(App App/main.cpp App/cli/args.cpp)\n"));
    assert!(text.contains(
        "set_source_files_properties(App/main.cpp PROPERTIES COMPILE_OPTIONS \"/std:c++20\")\n"
    ));
    assert!(text.contains(
        "set_source_files_properties(\"Core/src/math utils.cpp\" PROPERTIES COMPILE_OPTIONS \"$<$<CONFIG:Release>:/fp:fast>\")\n"
    ));
    assert!(text.contains("    \"$<$<CONFIG:Debug>:_DEBUG>\"\n"));
    assert!(text.contains(
        "    \"$<$<CONFIG:Debug>:${CMAKE_CURRENT_SOURCE_DIR}/Core/include>\"\n"
    ));
    assert!(text.contains("target_compile_options(App PRIVATE\n    \"$<$<CONFIG:Release>:/GL>\"\n)\n"));
    assert!(text.contains("target_link_libraries(App PRIVATE Core)\n"));
    assert!(text.contains("target_link_libraries(Plugin PRIVATE Core)\n"));
    assert!(!text.contains("Docs"));
    assert_eq!(rendered.warnings.len(), 1);
}

#[test]
fn test_render_groups_can_be_switched_off() {
    let options = RenderOptions {
        per_file_options: false,
        configuration_settings: false,
        link_dependencies: false,
        languages: vec!["C".to_string(), "CXX".to_string()],
        ..RenderOptions::default()
    };
    let rendered = render_cmake(&demo(), &options);
    assert!(rendered.text.contains("project(App LANGUAGES C CXX)\n"));
    assert!(!rendered.text.contains("set_source_files_properties"));
    assert!(!rendered.text.contains("target_compile_definitions"));
    assert!(!rendered.text.contains("target_link_libraries"));
}

#[test]
fn test_unresolved_macro_is_dropped_with_warning() {
    let project = r#"<PropertyGroup Condition="'$(Configuration)|$(Platform)'=='Debug|x64'">
  <ConfigurationType>StaticLibrary</ConfigurationType>
</PropertyGroup>
<ItemDefinitionGroup Condition="'$(Configuration)|$(Platform)'=='Debug|x64'">
  <ClCompile>
    <AdditionalIncludeDirectories>$(VcpkgRoot)include;include</AdditionalIncludeDirectories>
  </ClCompile>
</ItemDefinitionGroup>
<ItemGroup>
  <ClCompile Include="lib.cpp" />
</ItemGroup>"#;
    let rendered = render_cmake(&single(r"Lib\NAME.vcxproj", project), &RenderOptions::default());
    assert!(rendered
        .text
        .contains("    \"$<$<CONFIG:Debug>:${CMAKE_CURRENT_SOURCE_DIR}/Lib/include>\"\n"));
    assert!(!rendered.text.contains("VcpkgRoot"));
    assert_eq!(
        rendered.warnings,
        vec![GenerationWarning::UnresolvedMacro {
            project: "NAME".to_string(),
            value: "$(VcpkgRoot)include".to_string(),
            name: "VcpkgRoot".to_string(),
        }]
    );
}

#[test]
fn test_configuration_macro_in_include_directory() {
    let project = r#"<PropertyGroup Condition="'$(Configuration)|$(Platform)'=='Debug|Win32'">
  <ConfigurationType>Application</ConfigurationType>
</PropertyGroup>
<ItemDefinitionGroup Condition="'$(Configuration)|$(Platform)'=='Debug|Win32'">
  <ClCompile>
    <AdditionalIncludeDirectories>$(SolutionDir)lib\$(Configuration);$(Configuration)\gen</AdditionalIncludeDirectories>
  </ClCompile>
</ItemDefinitionGroup>
<ItemGroup>
  <ClCompile Include="main.cpp" />
</ItemGroup>"#;
    let rendered = render_cmake(&single(r"App\NAME.vcxproj", project), &RenderOptions::default());
    let text = &rendered.text;
    assert!(text.contains(
        "    \"$<$<CONFIG:Debug>:${CMAKE_CURRENT_SOURCE_DIR}/lib/$<CONFIG>>\"\n"
    ));
    assert!(text.contains(
        "    \"$<$<CONFIG:Debug>:${CMAKE_CURRENT_SOURCE_DIR}/App/$<CONFIG>/gen>\"\n"
    ));
    assert!(!text.contains("$<CONFIG$<ANGLE-R>"));
    assert!(rendered.warnings.is_empty());
}
