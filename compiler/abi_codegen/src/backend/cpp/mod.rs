//! C++ header backend.
//!
//! Emits one header per group plus shared `enums.hpp`/`delegates.hpp`
//! units and an aggregate main header. Method wrappers resolve the native
//! symbol lazily through the runtime's method-pointer lookup; classes are
//! RAII wrappers over the opaque handle, move-only when a destructor
//! exists.
//!
//! Open type world: names outside the primitive table are forward
//! references to declared enums, delegates, or classes. Arrays borrow in
//! value context regardless of element kind (`arrays_by_ref_in_value`).

use abi_ir::{Manifest, Method, Property};
use abi_types::{
    keywords, KeywordPolicy, MapperConfig, Primitive, TableMapper, TypeCtx, TypeMapper,
    UnknownTypePolicy,
};

use crate::groups::{self, SharedEnum};
use crate::ownership::{BindingPlan, ClassPlan, Ownership};
use crate::session::GenSession;
use crate::unit::UnitBuilder;
use crate::{Backend, FileMap, GenerateError, GenerateOptions};

pub struct CppBackend;

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Void => "void",
        Primitive::Bool => "bool",
        Primitive::Char8 => "char",
        Primitive::Char16 => "char16_t",
        Primitive::Int8 => "int8_t",
        Primitive::Int16 => "int16_t",
        Primitive::Int32 => "int32_t",
        Primitive::Int64 => "int64_t",
        Primitive::UInt8 => "uint8_t",
        Primitive::UInt16 => "uint16_t",
        Primitive::UInt32 => "uint32_t",
        Primitive::UInt64 => "uint64_t",
        Primitive::Ptr64 => "void*",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::String => "abi::string",
        Primitive::Any => "abi::any",
        Primitive::Vec2 => "abi::vec2",
        Primitive::Vec3 => "abi::vec3",
        Primitive::Vec4 => "abi::vec4",
        Primitive::Mat4x4 => "abi::mat4x4",
        Primitive::Function => "void*",
    }
}

fn mapper() -> TableMapper {
    TableMapper::new(MapperConfig {
        name: "cpp",
        primitive,
        array: |t| format!("abi::vector<{t}>"),
        value_borrow: Some(|t| format!("const {t}&")),
        mutable_ref: Some(|t| format!("{t}&")),
        arrays_by_ref_in_value: true,
        unknown: UnknownTypePolicy::Forward,
        null_literal: "nullptr",
        default_literal: "0",
    })
}

impl Backend for CppBackend {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn keyword_policy(&self) -> KeywordPolicy {
        KeywordPolicy::new(keywords::CPP)
    }

    fn emit(
        &self,
        manifest: &Manifest,
        options: &GenerateOptions<'_>,
    ) -> Result<FileMap, GenerateError> {
        let mapper = mapper();
        let mut session = GenSession::new();
        let mut files = FileMap::new();

        let name = &manifest.name;
        let groups = groups::partition(manifest);

        // Ownership analysis up front: any failure aborts before a single
        // file is produced.
        let plans = manifest
            .classes
            .iter()
            .map(|class| ClassPlan::build(manifest, class, &mapper))
            .collect::<Result<Vec<_>, _>>()?;

        let enums_path = format!("include/{name}/{name}/enums.hpp");
        session.claim_path(&enums_path);
        files.insert(
            enums_path,
            emit_enums_file(manifest, &mapper, &mut session, &plans, options)?,
        );

        let delegates_path = format!("include/{name}/{name}/delegates.hpp");
        session.claim_path(&delegates_path);
        files.insert(
            delegates_path,
            emit_delegates_file(manifest, &mapper, &mut session)?,
        );

        // Resolve unit file stems first: a group whose name collides with
        // a shared unit (`enums`, `delegates`) is renamed, and every
        // include that mentions it must follow.
        let mut stems = std::collections::BTreeMap::new();
        for group in &groups {
            let path = format!("include/{name}/{name}/{group}.hpp");
            if session.claim_path(&path) {
                stems.insert(group.clone(), group.clone());
            } else {
                let renamed = format!("{group}_group");
                session.claim_path(&format!("include/{name}/{name}/{renamed}.hpp"));
                stems.insert(group.clone(), renamed);
            }
        }

        for group in &groups {
            let stem = &stems[group];
            let content = emit_group_file(manifest, group, &stems, &mapper, &plans, options)?;
            files.insert(format!("include/{name}/{name}/{stem}.hpp"), content);
        }

        let group_files: Vec<String> = groups
            .iter()
            .map(|group| format!("{name}/{}.hpp", stems[group]))
            .collect();
        files.insert(
            format!("include/{name}/{name}.hpp"),
            emit_main_header(manifest, &group_files),
        );

        Ok(files)
    }
}

fn header_prelude(unit: &mut UnitBuilder, manifest: &Manifest) {
    unit.line("#pragma once");
    unit.blank();
    unit.line(&format!(
        "// Generated from the {} v{} manifest. Do not edit.",
        manifest.name, manifest.version
    ));
    unit.blank();
}

fn emit_enums_file(
    manifest: &Manifest,
    mapper: &TableMapper,
    session: &mut GenSession,
    plans: &[ClassPlan<'_>],
    options: &GenerateOptions<'_>,
) -> Result<String, GenerateError> {
    let mut unit = UnitBuilder::new();
    header_prelude(&mut unit, manifest);
    unit.line("#include <cstdint>");
    unit.blank();
    unit.line(&format!("namespace {} {{", manifest.name));
    unit.blank();
    unit.indent();

    for shared in groups::collect_enums(manifest, session) {
        if unit.claim(&shared.def.name) {
            emit_enum(&mut unit, &shared, mapper)?;
            unit.blank();
        }
    }

    // The ownership tag is part of every wrapper's surface.
    let needs_ownership =
        options.generate_classes && plans.iter().any(|plan| !plan.handleless);
    if needs_ownership && unit.claim("Ownership") {
        unit.line("// Controls whether a wrapper destroys its handle.");
        unit.line("enum class Ownership : uint8_t {");
        unit.line_deeper("Borrowed = 0,");
        unit.line_deeper("Owned = 1");
        unit.line("};");
        unit.blank();
    }

    unit.dedent();
    unit.line(&format!("}} // namespace {}", manifest.name));
    Ok(unit.finish())
}

fn emit_enum(
    unit: &mut UnitBuilder,
    shared: &SharedEnum<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let underlying = mapper.map_type(shared.underlying, TypeCtx::Cast, false)?;
    if !shared.def.description.is_empty() {
        unit.line(&format!("// {}", shared.def.description));
    }
    unit.line(&format!("enum class {} : {} {{", shared.def.name, underlying));
    unit.indent();
    let last = shared.def.values.len().saturating_sub(1);
    for (i, value) in shared.def.values.iter().enumerate() {
        let comma = if i == last { "" } else { "," };
        if value.description.is_empty() {
            unit.line(&format!("{} = {}{}", value.name, value.value, comma));
        } else {
            unit.line(&format!(
                "{} = {}{} // {}",
                value.name, value.value, comma, value.description
            ));
        }
    }
    unit.dedent();
    unit.line("};");
    Ok(())
}

fn emit_delegates_file(
    manifest: &Manifest,
    mapper: &TableMapper,
    session: &mut GenSession,
) -> Result<String, GenerateError> {
    let mut unit = UnitBuilder::new();
    header_prelude(&mut unit, manifest);
    unit.line("#include <abi/runtime.hpp>");
    unit.blank();
    unit.line(&format!("#include \"{0}/enums.hpp\"", manifest.name));
    unit.blank();
    unit.line(&format!("namespace {} {{", manifest.name));
    unit.blank();
    unit.indent();

    // Nested delegates are collected after the prototypes that mention
    // them; reverse so every name is declared before use.
    let delegates = groups::collect_delegates(manifest, session);
    for proto in delegates.iter().rev() {
        if !unit.claim(&proto.name) {
            continue;
        }
        if !proto.description.is_empty() {
            unit.line(&format!("// {}", proto.description));
        }
        let ret = mapper.map_return_type(&proto.ret_type)?;
        let params = format_param_types(&proto.param_types, mapper)?;
        unit.line(&format!("using {} = {} (*)({});", proto.name, ret, params));
        unit.blank();
    }

    unit.dedent();
    unit.line(&format!("}} // namespace {}", manifest.name));
    Ok(unit.finish())
}

fn emit_group_file(
    manifest: &Manifest,
    group: &str,
    stems: &std::collections::BTreeMap<String, String>,
    mapper: &TableMapper,
    plans: &[ClassPlan<'_>],
    options: &GenerateOptions<'_>,
) -> Result<String, GenerateError> {
    let mut unit = UnitBuilder::new();
    header_prelude(&mut unit, manifest);

    let group_plans: Vec<&ClassPlan<'_>> = if options.generate_classes {
        plans
            .iter()
            .filter(|plan| groups::group_key(&plan.class.group) == group)
            .collect()
    } else {
        Vec::new()
    };

    unit.line("#include <abi/runtime.hpp>");
    if group_plans.iter().any(|plan| {
        plan.bindings.iter().any(|binding| binding.null_check)
    }) {
        unit.line("#include <stdexcept>");
    }
    unit.line("#include <utility>");
    unit.blank();
    unit.line(&format!("#include \"{0}/enums.hpp\"", manifest.name));
    unit.line(&format!("#include \"{0}/delegates.hpp\"", manifest.name));
    for dep in groups::dependent_groups(manifest, group) {
        let stem = stems.get(&dep).unwrap_or(&dep);
        unit.line(&format!("#include \"{0}/{stem}.hpp\"", manifest.name));
    }
    unit.blank();

    unit.line(&format!("namespace {} {{", manifest.name));
    unit.blank();
    unit.indent();

    for method in &manifest.methods {
        if groups::group_key(&method.group) != group {
            continue;
        }
        if unit.claim(&method.name) {
            emit_method(&mut unit, manifest, method, mapper)?;
            unit.blank();
        }
    }

    for plan in group_plans {
        if unit.claim(&plan.class.name) {
            emit_class(&mut unit, manifest, plan, mapper)?;
            unit.blank();
        }
    }

    unit.dedent();
    unit.line(&format!("}} // namespace {}", manifest.name));
    Ok(unit.finish())
}

fn emit_main_header(manifest: &Manifest, group_files: &[String]) -> String {
    let mut unit = UnitBuilder::new();
    header_prelude(&mut unit, manifest);
    unit.line(&format!("#include \"{0}/enums.hpp\"", manifest.name));
    unit.line(&format!("#include \"{0}/delegates.hpp\"", manifest.name));
    for file in group_files {
        unit.line(&format!("#include \"{file}\""));
    }
    unit.finish()
}

fn emit_doc_comment(
    unit: &mut UnitBuilder,
    description: &str,
    params: &[Property],
    ret: &Property,
) {
    unit.line("/**");
    if !description.is_empty() {
        unit.line(&format!(" * @brief {description}"));
    }
    for param in params {
        let adorn = if param.is_ref { "&" } else { "" };
        if param.description.is_empty() {
            unit.line(&format!(" * @param {} ({}{})", param.name, param.ty, adorn));
        } else {
            unit.line(&format!(
                " * @param {} ({}{}): {}",
                param.name, param.ty, adorn, param.description
            ));
        }
    }
    if ret.ty != "void" && !ret.ty.is_empty() {
        if ret.description.is_empty() {
            unit.line(&format!(" * @return {}", ret.ty));
        } else {
            unit.line(&format!(" * @return {}: {}", ret.ty, ret.description));
        }
    }
    unit.line(" */");
}

fn emit_method(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    method: &Method,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    emit_doc_comment(unit, &method.description, &method.param_types, &method.ret_type);
    if !method.deprecated.is_empty() {
        unit.line(&format!("[[deprecated(\"{}\")]]", method.deprecated));
    }

    let ret = mapper.map_return_type(&method.ret_type)?;
    let params = format_params(&method.param_types, mapper)?;
    unit.line(&format!("inline {ret} {}({params}) {{", method.name));
    unit.indent();

    let fn_types = format_param_types(&method.param_types, mapper)?;
    unit.line(&format!("using {}Fn = {ret} (*)({fn_types});", method.name));
    unit.line(&format!("static {}Fn func = nullptr;", method.name));
    unit.line(&format!(
        "if (func == nullptr) abi::GetMethodPtr(\"{}.{}\", reinterpret_cast<void**>(&func));",
        manifest.name, method.func_name
    ));

    let args = format_arg_names(&method.param_types);
    if method.ret_type.ty == "void" {
        unit.line(&format!("func({args});"));
    } else {
        unit.line(&format!("return func({args});"));
    }

    unit.dedent();
    unit.line("}");
    Ok(())
}

fn emit_class(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    plan: &ClassPlan<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let class = plan.class;

    unit.line("/**");
    if class.description.is_empty() {
        unit.line(&format!(" * @brief {} wrapper", class.name));
    } else {
        unit.line(&format!(" * @brief {}", class.description));
    }
    unit.line(" */");
    if !class.deprecated.is_empty() {
        unit.line(&format!("[[deprecated(\"{}\")]]", class.deprecated));
    }
    unit.line(&format!("class {} final {{", class.name));
    unit.line("public:");
    unit.indent();

    if plan.handleless {
        emit_handleless_body(unit, manifest, plan, mapper)?;
        unit.dedent();
        unit.line("};");
        return Ok(());
    }

    let handle = &plan.handle_type;
    let invalid = &plan.invalid_value;
    let has_dtor = plan.has_destructor();

    if !plan.has_zero_param_ctor {
        unit.line(&format!("{}() = default;", class.name));
        unit.blank();
    }

    for ctor in &plan.constructors {
        emit_constructor(unit, manifest, plan, ctor, mapper)?;
    }

    if has_dtor {
        unit.line(&format!("~{}() {{", class.name));
        unit.line_deeper("destroy();");
        unit.line("}");
        unit.blank();
        unit.line(&format!("{0}(const {0}&) = delete;", class.name));
        unit.line(&format!("{0}& operator=(const {0}&) = delete;", class.name));
        unit.blank();
        unit.line(&format!("{0}({0}&& other) noexcept", class.name));
        unit.line_deeper(": handle_(other.handle_)");
        unit.line_deeper(", ownership_(other.ownership_) {");
        unit.line_deeper("other.nullify();");
        unit.line("}");
        unit.blank();
        unit.line(&format!("{0}& operator=({0}&& other) noexcept {{", class.name));
        unit.indent();
        unit.line("if (this != &other) {");
        unit.indent();
        unit.line("destroy();");
        unit.line("handle_ = other.handle_;");
        unit.line("ownership_ = other.ownership_;");
        unit.line("other.nullify();");
        unit.dedent();
        unit.line("}");
        unit.line("return *this;");
        unit.dedent();
        unit.line("}");
        unit.blank();
    } else {
        unit.line(&format!("{0}(const {0}&) = default;", class.name));
        unit.line(&format!("{0}& operator=(const {0}&) = default;", class.name));
        unit.line(&format!("{0}({0}&&) noexcept = default;", class.name));
        unit.line(&format!("{0}& operator=({0}&&) noexcept = default;", class.name));
        unit.line(&format!("~{}() = default;", class.name));
        unit.blank();
    }

    // Raw-handle constructor. The ownership default disappears when a
    // manifest constructor takes a single handle-typed parameter.
    let default_arg = match plan.raw_ctor_default {
        Some(ownership) => format!(" = Ownership::{}", ownership.name()),
        None => String::new(),
    };
    if has_dtor {
        unit.line(&format!(
            "{}({} handle, Ownership ownership{}) : handle_(handle), ownership_(ownership) {{}}",
            class.name, handle, default_arg
        ));
    } else if plan.has_constructors() {
        // Without a destructor the tag only disambiguates the raw-handle
        // overload from single-argument manifest constructors.
        unit.line(&format!(
            "explicit {}({} handle, Ownership{}) : handle_(handle) {{}}",
            class.name, handle, default_arg
        ));
    } else {
        unit.line(&format!(
            "explicit {}({} handle) : handle_(handle) {{}}",
            class.name, handle
        ));
    }
    unit.blank();

    unit.line("[[nodiscard]] auto get() const noexcept { return handle_; }");
    unit.blank();
    unit.line("[[nodiscard]] auto release() noexcept {");
    unit.indent();
    unit.line("auto handle = handle_;");
    if has_dtor {
        unit.line("nullify();");
    } else {
        unit.line(&format!("handle_ = {invalid};"));
    }
    unit.line("return handle;");
    unit.dedent();
    unit.line("}");
    unit.blank();
    unit.line("void reset() noexcept {");
    unit.indent();
    if has_dtor {
        unit.line("destroy();");
        unit.line("nullify();");
    } else {
        unit.line(&format!("handle_ = {invalid};"));
    }
    unit.dedent();
    unit.line("}");
    unit.blank();
    unit.line(&format!("void swap({}& other) noexcept {{", class.name));
    unit.indent();
    unit.line("using std::swap;");
    unit.line("swap(handle_, other.handle_);");
    if has_dtor {
        unit.line("swap(ownership_, other.ownership_);");
    }
    unit.dedent();
    unit.line("}");
    unit.blank();
    unit.line(&format!(
        "friend void swap({0}& lhs, {0}& rhs) noexcept {{ lhs.swap(rhs); }}",
        class.name
    ));
    unit.blank();
    unit.line(&format!(
        "explicit operator bool() const noexcept {{ return handle_ != {invalid}; }}"
    ));
    unit.line(&format!(
        "[[nodiscard]] bool operator==(const {}& other) const noexcept {{ return handle_ == other.handle_; }}",
        class.name
    ));
    unit.blank();

    for binding in &plan.bindings {
        emit_binding(unit, manifest, plan, binding, mapper)?;
        unit.blank();
    }

    unit.dedent();
    unit.line("private:");
    unit.indent();

    if has_dtor {
        let dtor = plan
            .destructor
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or_default();
        unit.line("void destroy() const noexcept {");
        unit.indent();
        unit.line(&format!(
            "if (handle_ != {invalid} && ownership_ == Ownership::Owned) {{"
        ));
        unit.line_deeper(&format!("{}::{}(handle_);", manifest.name, dtor));
        unit.line("}");
        unit.dedent();
        unit.line("}");
        unit.blank();
        unit.line("void nullify() noexcept {");
        unit.indent();
        unit.line(&format!("handle_ = {invalid};"));
        unit.line("ownership_ = Ownership::Borrowed;");
        unit.dedent();
        unit.line("}");
        unit.blank();
    }

    unit.line(&format!("{handle} handle_{{{invalid}}};"));
    if has_dtor {
        unit.line("Ownership ownership_{Ownership::Borrowed};");
    }

    unit.dedent();
    unit.line("};");
    Ok(())
}

fn emit_handleless_body(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    plan: &ClassPlan<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    unit.line(&format!("{}() = delete;", plan.class.name));
    unit.blank();
    for binding in &plan.bindings {
        emit_binding(unit, manifest, plan, binding, mapper)?;
        unit.blank();
    }
    Ok(())
}

fn emit_constructor(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    plan: &ClassPlan<'_>,
    ctor: &Method,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    emit_doc_comment(unit, &ctor.description, &ctor.param_types, &Property::default());

    let params = format_params(&ctor.param_types, mapper)?;
    let args = format_arg_names(&ctor.param_types);
    let call = format!("{}::{}({args})", manifest.name, ctor.name);
    unit.line(&format!("explicit {}({params})", plan.class.name));
    if plan.has_destructor() {
        unit.line_deeper(&format!(
            ": {}({call}, Ownership::Owned) {{}}",
            plan.class.name
        ));
    } else {
        unit.line_deeper(&format!(": handle_({call}) {{}}"));
    }
    unit.blank();
    Ok(())
}

fn emit_binding(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    plan: &ClassPlan<'_>,
    binding: &BindingPlan<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let method = binding.method;
    emit_doc_comment(unit, &method.description, binding.params, &method.ret_type);
    if !binding.binding.deprecated.is_empty() {
        unit.line(&format!("[[deprecated(\"{}\")]]", binding.binding.deprecated));
    }

    let mut ret = mapper.map_return_type(&method.ret_type)?;
    if let Some(alias) = binding.ret_alias() {
        ret = alias.name.clone();
    }

    let mut rendered = Vec::new();
    for (i, param) in binding.params.iter().enumerate() {
        let ty = match binding.param_alias(i) {
            Some(alias) if alias.owner => format!("{}&&", alias.name),
            Some(alias) => format!("const {}&", alias.name),
            None => mapper.map_param_type(param, TypeCtx::Value)?,
        };
        let mut part = format!("{ty} {}", param.name);
        if let Some(default) = param.default {
            part.push_str(&format!(" = {default}"));
        }
        rendered.push(part);
    }
    let params = rendered.join(", ");

    let is_static = !binding.binding.bind_self;
    let prefix = if is_static { "static " } else { "" };
    unit.line(&format!("{prefix}{ret} {}({params}) {{", binding.binding.name));
    unit.indent();

    if binding.null_check {
        unit.line(&format!(
            "if (handle_ == {}) throw std::runtime_error(\"{}: empty handle\");",
            plan.invalid_value, plan.class.name
        ));
    }

    let mut args = Vec::new();
    if binding.binding.bind_self {
        args.push("handle_".to_string());
    }
    for (i, param) in binding.params.iter().enumerate() {
        let arg = match binding.param_alias(i) {
            Some(alias) if alias.owner => format!("{}.release()", param.name),
            Some(_) => format!("{}.get()", param.name),
            None => param.name.clone(),
        };
        args.push(arg);
    }
    let call = format!("{}::{}({})", manifest.name, method.name, args.join(", "));

    if method.ret_type.ty == "void" {
        unit.line(&format!("{call};"));
    } else if let Some(alias) = binding.ret_alias() {
        let ownership = if alias.owner {
            Ownership::Owned
        } else {
            Ownership::Borrowed
        };
        unit.line(&format!(
            "return {}({call}, Ownership::{});",
            alias.name,
            ownership.name()
        ));
    } else {
        unit.line(&format!("return {call};"));
    }

    unit.dedent();
    unit.line("}");
    Ok(())
}

fn format_params(params: &[Property], mapper: &TableMapper) -> Result<String, GenerateError> {
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        let ty = mapper.map_param_type(param, TypeCtx::Value)?;
        let mut part = format!("{ty} {}", param.name);
        if let Some(default) = param.default {
            part.push_str(&format!(" = {default}"));
        }
        rendered.push(part);
    }
    Ok(rendered.join(", "))
}

fn format_param_types(params: &[Property], mapper: &TableMapper) -> Result<String, GenerateError> {
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        rendered.push(mapper.map_param_type(param, TypeCtx::Value)?);
    }
    Ok(rendered.join(", "))
}

fn format_arg_names(params: &[Property]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests;
