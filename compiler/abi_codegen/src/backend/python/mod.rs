//! Python backend.
//!
//! Emits one typed stub unit (`stubs/<name>.pyi`) for the dynamic runtime:
//! enums as `IntEnum` classes, methods as annotated signatures, classes
//! with the same ownership surface as the native backends (`get`,
//! `release`, `reset`, `valid`) plus finalizer and context-manager hooks
//! when a destructor exists.
//!
//! Open type world. Delegates render structurally as `Callable[...]`
//! types rather than named declarations, so there is no delegates unit.
//! `ref` parameters are out-parameters: they join the return annotation as
//! a tuple.

use abi_ir::{Manifest, Method, Property, Prototype};
use abi_types::{
    keywords, KeywordPolicy, MapperConfig, Primitive, TableMapper, TypeCtx, TypeMapper,
    UnknownTypePolicy,
};

use crate::groups::{self, SharedEnum};
use crate::ownership::{BindingPlan, ClassPlan};
use crate::session::GenSession;
use crate::unit::UnitBuilder;
use crate::{Backend, FileMap, GenerateError, GenerateOptions};

pub struct PythonBackend;

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Void => "None",
        Primitive::Bool => "bool",
        Primitive::Char8 | Primitive::Char16 | Primitive::String => "str",
        Primitive::Int8
        | Primitive::Int16
        | Primitive::Int32
        | Primitive::Int64
        | Primitive::UInt8
        | Primitive::UInt16
        | Primitive::UInt32
        | Primitive::UInt64
        | Primitive::Ptr64 => "int",
        Primitive::Float | Primitive::Double => "float",
        Primitive::Any => "object",
        Primitive::Vec2 => "Vector2",
        Primitive::Vec3 => "Vector3",
        Primitive::Vec4 => "Vector4",
        Primitive::Mat4x4 => "Matrix4x4",
        Primitive::Function => "Callable[..., object]",
    }
}

fn mapper() -> TableMapper {
    TableMapper::new(MapperConfig {
        name: "python",
        primitive,
        array: |t| format!("list[{t}]"),
        value_borrow: None,
        mutable_ref: None,
        arrays_by_ref_in_value: false,
        unknown: UnknownTypePolicy::Forward,
        null_literal: "None",
        default_literal: "None",
    })
}

/// Structural `Callable` type for a prototype.
fn callable_type(proto: &Prototype, mapper: &TableMapper) -> Result<String, GenerateError> {
    let mut params = Vec::with_capacity(proto.param_types.len());
    for param in &proto.param_types {
        params.push(param_type(param, mapper)?);
    }
    let ret = return_type(&proto.ret_type, mapper)?;
    Ok(format!("Callable[[{}], {}]", params.join(", "), ret))
}

fn param_type(param: &Property, mapper: &TableMapper) -> Result<String, GenerateError> {
    if let Some(proto) = &param.prototype {
        return callable_type(proto, mapper);
    }
    Ok(mapper.map_param_type(param, TypeCtx::Value)?)
}

fn return_type(ret: &Property, mapper: &TableMapper) -> Result<String, GenerateError> {
    if let Some(proto) = &ret.prototype {
        return callable_type(proto, mapper);
    }
    Ok(mapper.map_return_type(ret)?)
}

/// Return annotation: the mapped return type, joined with every `ref`
/// out-parameter as a tuple.
fn return_annotation(
    ret: &Property,
    params: &[Property],
    mapper: &TableMapper,
) -> Result<String, GenerateError> {
    let base = return_type(ret, mapper)?;
    let mut out: Vec<String> = Vec::new();
    for param in params {
        if param.is_ref {
            out.push(param_type(param, mapper)?);
        }
    }
    if out.is_empty() {
        return Ok(base);
    }
    let mut parts = vec![base];
    parts.extend(out);
    Ok(format!("tuple[{}]", parts.join(", ")))
}

fn format_params(params: &[Property], mapper: &TableMapper) -> Result<String, GenerateError> {
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        let ty = param_type(param, mapper)?;
        let mut part = format!("{}: {ty}", param.name);
        if let Some(default) = param.default {
            part.push_str(&format!(" = {default}"));
        }
        rendered.push(part);
    }
    Ok(rendered.join(", "))
}

fn uses_callable(manifest: &Manifest) -> bool {
    manifest.methods.iter().any(|m| {
        m.ret_type.prototype.is_some()
            || m.ret_type.ty == "function"
            || m.param_types
                .iter()
                .any(|p| p.prototype.is_some() || p.ty == "function")
    })
}

impl Backend for PythonBackend {
    fn name(&self) -> &'static str {
        "python"
    }

    fn keyword_policy(&self) -> KeywordPolicy {
        KeywordPolicy::new(keywords::PYTHON)
    }

    fn emit(
        &self,
        manifest: &Manifest,
        options: &GenerateOptions<'_>,
    ) -> Result<FileMap, GenerateError> {
        let mapper = mapper();
        let mut session = GenSession::new();
        let mut unit = UnitBuilder::new();

        let plans = manifest
            .classes
            .iter()
            .map(|class| ClassPlan::build(manifest, class, &mapper))
            .collect::<Result<Vec<_>, _>>()?;

        if uses_callable(manifest) {
            unit.line("from collections.abc import Callable");
        }
        unit.line("from enum import IntEnum");
        unit.line("from abi.runtime import Matrix4x4, Vector2, Vector3, Vector4");
        unit.blank();
        unit.line(&format!(
            "# Generated from the {} v{} manifest. Do not edit.",
            manifest.name, manifest.version
        ));
        unit.blank();

        for shared in groups::collect_enums(manifest, &mut session) {
            if unit.claim(&shared.def.name) {
                emit_enum(&mut unit, &shared);
                unit.blank();
            }
        }

        for method in &manifest.methods {
            if unit.claim(&method.name) {
                emit_method(&mut unit, method, &mapper)?;
                unit.blank();
            }
        }

        if options.generate_classes {
            for plan in &plans {
                if unit.claim(&plan.class.name) {
                    emit_class(&mut unit, plan, &mapper)?;
                    unit.blank();
                }
            }
        }

        let mut files = FileMap::new();
        files.insert(format!("stubs/{}.pyi", manifest.name), unit.finish());
        Ok(files)
    }
}

fn emit_enum(unit: &mut UnitBuilder, shared: &SharedEnum<'_>) {
    unit.line(&format!("class {}(IntEnum):", shared.def.name));
    unit.indent();
    if !shared.def.description.is_empty() {
        unit.line("\"\"\"");
        unit.line(&shared.def.description);
        unit.line("\"\"\"");
    }
    if shared.def.values.is_empty() {
        unit.line("...");
    }
    for value in &shared.def.values {
        if !value.description.is_empty() {
            unit.line(&format!("# {}", value.description));
        }
        unit.line(&format!("{} = {}", value.name, value.value));
    }
    unit.dedent();
}

fn emit_docstring(
    unit: &mut UnitBuilder,
    description: &str,
    params: &[Property],
    ret: &Property,
) {
    let documents_return = ret.ty != "void" && !ret.ty.is_empty();
    if description.is_empty() && params.is_empty() && !documents_return {
        return;
    }
    unit.line("\"\"\"");
    if !description.is_empty() {
        unit.line(description);
    }
    if !params.is_empty() {
        if !description.is_empty() {
            unit.blank();
        }
        unit.line("Args:");
        for param in params {
            let desc = if param.description.is_empty() {
                &param.name
            } else {
                &param.description
            };
            unit.line_deeper(&format!("{} ({}): {desc}", param.name, param.ty));
        }
    }
    if ret.ty != "void" && !ret.ty.is_empty() {
        unit.blank();
        unit.line("Returns:");
        let desc = if ret.description.is_empty() {
            "Return value"
        } else {
            &ret.description
        };
        unit.line_deeper(&format!("{}: {desc}", ret.ty));
    }
    unit.line("\"\"\"");
}

fn emit_method(
    unit: &mut UnitBuilder,
    method: &Method,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let params = format_params(&method.param_types, mapper)?;
    let ret = return_annotation(&method.ret_type, &method.param_types, mapper)?;
    unit.line(&format!("def {}({params}) -> {ret}:", method.name));
    unit.indent();
    emit_docstring(unit, &method.description, &method.param_types, &method.ret_type);
    unit.line("...");
    unit.dedent();
    Ok(())
}

fn emit_class(
    unit: &mut UnitBuilder,
    plan: &ClassPlan<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let class = plan.class;
    unit.line(&format!("class {}:", class.name));
    unit.indent();
    if !class.description.is_empty() {
        unit.line("\"\"\"");
        unit.line(&class.description);
        unit.line("\"\"\"");
    }

    if plan.handleless {
        for binding in &plan.bindings {
            emit_binding(unit, binding, mapper)?;
            unit.blank();
        }
        unit.dedent();
        return Ok(());
    }

    let handle = mapper.map_type(&class.handle_type, TypeCtx::Return, false)?;

    if plan.constructors.is_empty() {
        unit.line("def __init__(self) -> None:");
        unit.line_deeper("...");
        unit.blank();
    }
    for ctor in &plan.constructors {
        let params = format_params(&ctor.param_types, mapper)?;
        if params.is_empty() {
            unit.line("def __init__(self) -> None:");
        } else {
            unit.line(&format!("def __init__(self, {params}) -> None:"));
        }
        unit.indent();
        emit_docstring(unit, &ctor.description, &ctor.param_types, &Property::default());
        unit.line("...");
        unit.dedent();
        unit.blank();
    }

    if plan.has_destructor() {
        unit.line("def __del__(self) -> None:");
        unit.indent();
        unit.line("\"\"\"Finalizer. Destroys the handle if still owned; a no-op after release().\"\"\"");
        unit.line("...");
        unit.dedent();
        unit.blank();
        unit.line(&format!("def __enter__(self) -> \"{}\":", class.name));
        unit.line_deeper("...");
        unit.blank();
        unit.line("def __exit__(self, exc_type: type[BaseException] | None, exc_val: BaseException | None, exc_tb: object) -> None:");
        unit.line_deeper("...");
        unit.blank();
        unit.line("def close(self) -> None:");
        unit.indent();
        unit.line("\"\"\"Destroys the handle now if owned.\"\"\"");
        unit.line("...");
        unit.dedent();
        unit.blank();
    }

    unit.line(&format!("def get(self) -> {handle}:"));
    unit.indent();
    unit.line("\"\"\"Reads the raw handle without transferring ownership.\"\"\"");
    unit.line("...");
    unit.dedent();
    unit.blank();
    unit.line(&format!("def release(self) -> {handle}:"));
    unit.indent();
    unit.line("\"\"\"Releases ownership and returns the raw handle; cancels the finalizer.\"\"\"");
    unit.line("...");
    unit.dedent();
    unit.blank();
    unit.line("def reset(self) -> None:");
    unit.indent();
    unit.line("\"\"\"Destroys the handle if owned and invalidates the wrapper.\"\"\"");
    unit.line("...");
    unit.dedent();
    unit.blank();
    unit.line("def valid(self) -> bool:");
    unit.line_deeper("...");
    unit.blank();

    for binding in &plan.bindings {
        emit_binding(unit, binding, mapper)?;
        unit.blank();
    }

    unit.dedent();
    Ok(())
}

fn emit_binding(
    unit: &mut UnitBuilder,
    binding: &BindingPlan<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let method = binding.method;

    let mut params = Vec::new();
    for (i, param) in binding.params.iter().enumerate() {
        let ty = match binding.param_alias(i) {
            Some(alias) => alias.name.clone(),
            None => param_type(param, mapper)?,
        };
        params.push(format!("{}: {ty}", param.name));
    }

    let mut ret = return_annotation(&method.ret_type, binding.params, mapper)?;
    if let Some(alias) = binding.ret_alias() {
        ret = format!("\"{}\"", alias.name);
    }

    if binding.binding.bind_self {
        let sep = if params.is_empty() { "" } else { ", " };
        unit.line(&format!(
            "def {}(self{sep}{}) -> {ret}:",
            binding.binding.name,
            params.join(", ")
        ));
    } else {
        unit.line("@staticmethod");
        unit.line(&format!(
            "def {}({}) -> {ret}:",
            binding.binding.name,
            params.join(", ")
        ));
    }
    unit.indent();
    emit_docstring(unit, &method.description, binding.params, &method.ret_type);
    unit.line("...");
    unit.dedent();
    Ok(())
}
