//! C# backend.
//!
//! The managed-runtime emitter: every non-blittable value crosses the
//! boundary through the construct → call → unmarshal → destroy staging
//! protocol laid out by [`CallPlan`], with `fixed` blocks pinning `ref`
//! scalars and PODs for the call's duration. Classes with a destructor
//! derive from `SafeHandle` so finalization and explicit disposal share
//! one at-most-once release path.
//!
//! Closed type world: a base type name outside the primitive table is an
//! `UnsupportedTypeError`, never a silent fall-through. Arrays are managed
//! reference values already, so `arrays_by_ref_in_value` stays off.

use abi_ir::{Manifest, Method, Property};
use abi_types::{
    keywords, KeywordPolicy, MapperConfig, MarshalKind, Primitive, TableMapper, TypeCtx,
    TypeError, TypeMapper, UnknownTypePolicy,
};

use crate::groups::{self, SharedEnum};
use crate::marshal::{CallPlan, StagingHooks};
use crate::ownership::{BindingPlan, ClassPlan, Ownership};
use crate::session::GenSession;
use crate::unit::UnitBuilder;
use crate::{Backend, FileMap, GenerateError, GenerateOptions};

pub struct CSharpBackend;

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Void => "void",
        Primitive::Bool => "Bool8",
        Primitive::Char8 => "Char8",
        Primitive::Char16 => "Char16",
        Primitive::Int8 => "sbyte",
        Primitive::Int16 => "short",
        Primitive::Int32 => "int",
        Primitive::Int64 => "long",
        Primitive::UInt8 => "byte",
        Primitive::UInt16 => "ushort",
        Primitive::UInt32 => "uint",
        Primitive::UInt64 => "ulong",
        Primitive::Ptr64 => "nint",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::String => "string",
        Primitive::Any => "object",
        Primitive::Vec2 => "Vector2",
        Primitive::Vec3 => "Vector3",
        Primitive::Vec4 => "Vector4",
        Primitive::Mat4x4 => "Matrix4x4",
        Primitive::Function => "nint",
    }
}

fn mapper() -> TableMapper {
    TableMapper::new(MapperConfig {
        name: "csharp",
        primitive,
        array: |t| format!("{t}[]"),
        value_borrow: None,
        mutable_ref: Some(|t| format!("ref {t}")),
        arrays_by_ref_in_value: false,
        unknown: UnknownTypePolicy::Reject,
        null_literal: "nint.Zero",
        default_literal: "default",
    })
}

/// Runtime staging-table suffix for an array's element kind.
fn vector_suffix(base: &str) -> Option<&'static str> {
    Some(match Primitive::from_name(base)? {
        Primitive::Bool => "Bool",
        Primitive::Char8 => "Char8",
        Primitive::Char16 => "Char16",
        Primitive::Int8 => "Int8",
        Primitive::Int16 => "Int16",
        Primitive::Int32 => "Int32",
        Primitive::Int64 => "Int64",
        Primitive::UInt8 => "UInt8",
        Primitive::UInt16 => "UInt16",
        Primitive::UInt32 => "UInt32",
        Primitive::UInt64 => "UInt64",
        Primitive::Ptr64 => "IntPtr",
        Primitive::Float => "Float",
        Primitive::Double => "Double",
        Primitive::String => "String",
        Primitive::Any => "Variant",
        Primitive::Vec2 => "Vector2",
        Primitive::Vec3 => "Vector3",
        Primitive::Vec4 => "Vector4",
        Primitive::Mat4x4 => "Matrix4x4",
        Primitive::Void | Primitive::Function => return None,
    })
}

/// Staging function tables for the managed runtime. Enum-typed values use
/// the generically-typed `NativeMethodsT` entry points.
struct CsHooks;

impl CsHooks {
    fn class_of(prop: &Property) -> &'static str {
        if prop.enum_.is_some() {
            "NativeMethodsT"
        } else {
            "NativeMethods"
        }
    }
}

impl StagingHooks for CsHooks {
    fn construct_fn(&self, prop: &Property) -> Option<String> {
        let class = Self::class_of(prop);
        if prop.is_array() {
            let suffix = vector_suffix(prop.base_type())?;
            return Some(format!("{class}.ConstructVector{suffix}"));
        }
        match Primitive::from_name(prop.base_type())? {
            Primitive::String => Some(format!("{class}.ConstructString")),
            Primitive::Any => Some(format!("{class}.ConstructVariant")),
            _ => None,
        }
    }

    fn data_fn(&self, prop: &Property) -> Option<String> {
        let class = Self::class_of(prop);
        if prop.is_array() {
            let suffix = vector_suffix(prop.base_type())?;
            return Some(format!("{class}.GetVectorData{suffix}"));
        }
        match Primitive::from_name(prop.base_type())? {
            Primitive::String => Some(format!("{class}.GetStringData")),
            Primitive::Any => Some(format!("{class}.GetVariantData")),
            _ => None,
        }
    }

    fn size_fn(&self, prop: &Property) -> Option<String> {
        if !prop.is_array() {
            return None;
        }
        let suffix = vector_suffix(prop.base_type())?;
        Some(format!("{}.GetVectorSize{suffix}", Self::class_of(prop)))
    }

    fn destroy_fn(&self, prop: &Property) -> Option<String> {
        let class = Self::class_of(prop);
        if prop.is_array() {
            let suffix = vector_suffix(prop.base_type())?;
            return Some(format!("{class}.DestroyVector{suffix}"));
        }
        match Primitive::from_name(prop.base_type())? {
            Primitive::String => Some(format!("{class}.DestroyString")),
            Primitive::Any => Some(format!("{class}.DestroyVariant")),
            _ => None,
        }
    }

    fn staging_type(&self, prop: &Property) -> Option<String> {
        if prop.is_array() {
            return Some("NativeVector".to_string());
        }
        match Primitive::from_name(prop.base_type())? {
            Primitive::String => Some("NativeString".to_string()),
            Primitive::Any => Some("NativeVariant".to_string()),
            _ => None,
        }
    }
}

/// The C-side type of a parameter in the unmanaged function pointer.
fn unmanaged_param(prop: &Property) -> Result<String, GenerateError> {
    if let Some(enum_) = &prop.enum_ {
        if !prop.is_array() {
            let mut ty = enum_.name.clone();
            if prop.is_ref {
                ty.push('*');
            }
            return Ok(ty);
        }
    }
    if prop.prototype.is_some() {
        return Ok("nint".to_string());
    }
    if prop.is_array() {
        return Ok("NativeVector*".to_string());
    }

    let mut ty = match Primitive::from_name(prop.base_type()) {
        Some(Primitive::String) => "NativeString*".to_string(),
        Some(Primitive::Any) => "NativeVariant*".to_string(),
        Some(p) if p.is_pod() => format!("{}*", primitive(p)),
        Some(p) => primitive(p).to_string(),
        None => {
            return Err(GenerateError::Type(TypeError::Unsupported {
                name: prop.base_type().to_string(),
            }));
        }
    };
    if prop.is_ref && !ty.ends_with('*') {
        ty.push('*');
    }
    Ok(ty)
}

/// The C-side return type: like [`unmanaged_param`] but never a pointer
/// for by-value staging returns.
fn unmanaged_return(prop: &Property) -> Result<String, GenerateError> {
    let mut ty = unmanaged_param(&Property {
        is_ref: false,
        ..prop.clone()
    })?;
    if ty.ends_with('*') {
        ty.pop();
    }
    Ok(ty)
}

impl Backend for CSharpBackend {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn keyword_policy(&self) -> KeywordPolicy {
        KeywordPolicy::new(keywords::CSHARP)
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

        let plans = manifest
            .classes
            .iter()
            .map(|class| ClassPlan::build(manifest, class, &mapper))
            .collect::<Result<Vec<_>, _>>()?;

        let enums_path = format!("imported/{name}/enums.cs");
        session.claim_path(&enums_path);
        files.insert(enums_path, emit_enums_file(manifest, &mapper, &mut session)?);

        let delegates_path = format!("imported/{name}/delegates.cs");
        session.claim_path(&delegates_path);
        files.insert(
            delegates_path,
            emit_delegates_file(manifest, &mapper, &mut session)?,
        );

        for group in &groups {
            let mut path = format!("imported/{name}/{group}.cs");
            if !session.claim_path(&path) {
                path = format!("imported/{name}/{group}_group.cs");
                session.claim_path(&path);
            }
            files.insert(
                path,
                emit_group_file(manifest, group, &mapper, &plans, options)?,
            );
        }

        Ok(files)
    }
}

fn emit_xml_summary(unit: &mut UnitBuilder, text: &str) {
    unit.line("/// <summary>");
    unit.line(&format!("/// {text}"));
    unit.line("/// </summary>");
}

fn emit_enums_file(
    manifest: &Manifest,
    mapper: &TableMapper,
    session: &mut GenSession,
) -> Result<String, GenerateError> {
    let mut unit = UnitBuilder::new();
    unit.line("using System;");
    unit.blank();
    unit.line(&format!(
        "// Generated from the {} v{} manifest. Do not edit.",
        manifest.name, manifest.version
    ));
    unit.blank();
    unit.line(&format!("namespace {} {{", manifest.name));
    unit.line("#pragma warning disable CS0649");
    unit.blank();
    unit.indent();

    for shared in groups::collect_enums(manifest, session) {
        if unit.claim(&shared.def.name) {
            emit_enum(&mut unit, &shared, mapper)?;
            unit.blank();
        }
    }

    if unit.claim("Ownership") {
        emit_xml_summary(&mut unit, "Controls whether a wrapper destroys its handle.");
        unit.line("internal enum Ownership { Borrowed, Owned }");
        unit.blank();
    }

    unit.dedent();
    unit.line("#pragma warning restore CS0649");
    unit.line("}");
    Ok(unit.finish())
}

fn emit_enum(
    unit: &mut UnitBuilder,
    shared: &SharedEnum<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let underlying = mapper.map_type(shared.underlying, TypeCtx::Cast, false)?;
    if !shared.def.description.is_empty() {
        emit_xml_summary(unit, &shared.def.description);
    }
    unit.line(&format!("public enum {} : {}", shared.def.name, underlying));
    unit.line("{");
    unit.indent();
    let last = shared.def.values.len().saturating_sub(1);
    for (i, value) in shared.def.values.iter().enumerate() {
        if !value.description.is_empty() {
            emit_xml_summary(unit, &value.description);
        }
        let comma = if i == last { "" } else { "," };
        unit.line(&format!("{} = {}{}", value.name, value.value, comma));
    }
    unit.dedent();
    unit.line("}");
    Ok(())
}

fn emit_delegates_file(
    manifest: &Manifest,
    mapper: &TableMapper,
    session: &mut GenSession,
) -> Result<String, GenerateError> {
    let mut unit = UnitBuilder::new();
    unit.line("using System;");
    unit.line("using System.Numerics;");
    unit.blank();
    unit.line("using AbiRuntime;");
    unit.blank();
    unit.line(&format!(
        "// Generated from the {} v{} manifest. Do not edit.",
        manifest.name, manifest.version
    ));
    unit.blank();
    unit.line(&format!("namespace {} {{", manifest.name));
    unit.line("#pragma warning disable CS0649");
    unit.blank();
    unit.indent();

    for proto in groups::collect_delegates(manifest, session) {
        if !unit.claim(&proto.name) {
            continue;
        }
        if !proto.description.is_empty() {
            emit_xml_summary(&mut unit, &proto.description);
        }
        let ret = mapper.map_return_type(&proto.ret_type)?;
        let params = format_delegate_params(&proto.param_types, mapper)?;
        unit.line(&format!("public delegate {ret} {}({params});", proto.name));
        unit.blank();
    }

    unit.dedent();
    unit.line("#pragma warning restore CS0649");
    unit.line("}");
    Ok(unit.finish())
}

/// Delegate parameters take `ref` for PODs unconditionally (the native
/// caller passes pointers), and for anything the manifest flags.
fn format_delegate_params(
    params: &[Property],
    mapper: &TableMapper,
) -> Result<String, GenerateError> {
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        let pod = Primitive::from_name(param.base_type()).is_some_and(Primitive::is_pod)
            && !param.is_array();
        let ty = if pod && !param.is_ref && param.enum_.is_none() {
            format!("ref {}", mapper.map_type(param.base_type(), TypeCtx::Cast, false)?)
        } else {
            mapper.map_param_type(param, TypeCtx::Value)?
        };
        rendered.push(format!("{ty} {}", param.name));
    }
    Ok(rendered.join(", "))
}

fn emit_group_file(
    manifest: &Manifest,
    group: &str,
    mapper: &TableMapper,
    plans: &[ClassPlan<'_>],
    options: &GenerateOptions<'_>,
) -> Result<String, GenerateError> {
    let mut unit = UnitBuilder::new();
    unit.line("using System;");
    unit.line("using System.Numerics;");
    unit.line("using System.Runtime.CompilerServices;");
    unit.line("using System.Runtime.InteropServices;");
    unit.blank();
    unit.line("using AbiRuntime;");
    unit.blank();
    unit.line(&format!(
        "// Generated from the {} v{} manifest (group: {group}). Do not edit.",
        manifest.name, manifest.version
    ));
    unit.blank();
    unit.line(&format!("namespace {} {{", manifest.name));
    unit.line("#pragma warning disable CS0649");
    unit.blank();
    unit.indent();

    unit.line(&format!(
        "internal static unsafe partial class {} {{",
        manifest.name
    ));
    unit.blank();
    unit.indent();
    for method in &manifest.methods {
        if groups::group_key(&method.group) != group {
            continue;
        }
        if unit.claim(&method.name) {
            emit_method(&mut unit, method, mapper)?;
            unit.blank();
        }
    }
    unit.dedent();
    unit.line("}");
    unit.blank();

    if options.generate_classes {
        for plan in plans {
            if groups::group_key(&plan.class.group) != group {
                continue;
            }
            if unit.claim(&plan.class.name) {
                emit_class(&mut unit, manifest, plan, mapper)?;
                unit.blank();
            }
        }
    }

    unit.dedent();
    unit.line("#pragma warning restore CS0649");
    unit.line("}");
    Ok(unit.finish())
}

fn emit_method_docs(unit: &mut UnitBuilder, method: &Method) {
    let summary = if method.description.is_empty() {
        &method.name
    } else {
        &method.description
    };
    emit_xml_summary(unit, summary);
    for param in &method.param_types {
        let desc = if param.description.is_empty() {
            &param.name
        } else {
            &param.description
        };
        unit.line(&format!(
            "/// <param name=\"{}\">{desc}</param>",
            param.name
        ));
    }
    if method.ret_type.ty != "void" && !method.ret_type.description.is_empty() {
        unit.line(&format!(
            "/// <returns>{}</returns>",
            method.ret_type.description
        ));
    }
}

/// The managed local type for the method's result.
fn ret_local_type(method: &Method, mapper: &TableMapper) -> Result<String, GenerateError> {
    if MarshalKind::of(&method.ret_type) == MarshalKind::Delegate {
        // The native call yields a raw function pointer; conversion to the
        // delegate type happens at the return statement.
        return Ok("nint".to_string());
    }
    Ok(mapper.map_return_type(&method.ret_type)?)
}

fn emit_method(
    unit: &mut UnitBuilder,
    method: &Method,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    emit_method_docs(unit, method);
    if !method.deprecated.is_empty() {
        unit.line(&format!("[Obsolete(\"{}\")]", method.deprecated));
    }

    let managed_ret = mapper.map_return_type(&method.ret_type)?;
    let mut managed_types = Vec::new();
    let mut unmanaged_types = Vec::new();
    let mut params = Vec::new();
    for param in &method.param_types {
        let ty = mapper.map_param_type(param, TypeCtx::Value)?;
        managed_types.push(ty.clone());
        unmanaged_types.push(unmanaged_param(param)?);
        let mut part = format!("{ty} {}", param.name);
        if let Some(default) = param.default {
            part.push_str(&format!(" = {default}"));
        }
        params.push(part);
    }
    managed_types.push(managed_ret.clone());
    unmanaged_types.push(unmanaged_return(&method.ret_type)?);

    unit.line(&format!(
        "internal static delegate*<{}> {} = &___{};",
        managed_types.join(", "),
        method.name,
        method.name
    ));
    unit.line(&format!(
        "internal static delegate* unmanaged[Cdecl]<{}> __{};",
        unmanaged_types.join(", "),
        method.name
    ));
    unit.blank();
    unit.line(&format!(
        "private static {managed_ret} ___{}({})",
        method.name,
        params.join(", ")
    ));
    unit.line("{");
    unit.indent();
    emit_method_body(unit, method, mapper)?;
    unit.dedent();
    unit.line("}");
    Ok(())
}

fn emit_method_body(
    unit: &mut UnitBuilder,
    method: &Method,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let plan = CallPlan::build(method, &CsHooks);
    let local_ty = ret_local_type(method, mapper)?;

    // Result locals come first so they outlive every scope below.
    if plan.declares_ret_early() {
        unit.line(&format!("{local_ty} __retVal;"));
    }
    if let Some(ret) = &plan.ret_staging {
        unit.line(&format!("{} __retVal_native;", ret.staging_type));
    }

    // Pinned scopes: ref scalars, enums, and PODs.
    for param in &plan.pinned {
        let ty = if let Some(enum_) = &param.enum_ {
            enum_.name.clone()
        } else {
            mapper.map_type(param.base_type(), TypeCtx::Cast, false)?
        };
        unit.line(&format!(
            "fixed ({ty}* __{0} = &{0}) {{",
            param.name
        ));
        unit.indent();
    }

    // Object-like staging: construct before the guarded region so a
    // construction failure never reaches the destroy path.
    for staged in &plan.staged {
        if staged.construct.contains("ConstructVector") {
            unit.line(&format!(
                "var __{0} = {1}({0}, {0}.Length);",
                staged.prop.name, staged.construct
            ));
        } else {
            unit.line(&format!(
                "var __{0} = {1}({0});",
                staged.prop.name, staged.construct
            ));
        }
    }

    let guard = plan.needs_guard();
    if guard {
        unit.line("try {");
        unit.indent();
    }

    // The native call.
    let args = call_args(&plan);
    if plan.ret_staging.is_some() {
        unit.line(&format!("__retVal_native = __{}({args});", method.name));
    } else if plan.declares_ret_early() {
        unit.line(&format!("__retVal = __{}({args});", method.name));
    } else if plan.has_return {
        unit.line(&format!("{local_ty} __retVal = __{}({args});", method.name));
    } else {
        unit.line(&format!("__{}({args});", method.name));
    }

    // Unmarshal: staging → managed, before any destroy runs.
    let ref_backs: Vec<_> = plan.ref_unmarshals().collect();
    if plan.ret_staging.is_some() || !ref_backs.is_empty() {
        unit.line("// Unmarshal: convert native data to managed data.");
    }
    if let Some(ret) = &plan.ret_staging {
        if let Some(size) = &ret.size {
            let element = mapper
                .map_return_type(&method.ret_type)?
                .trim_end_matches("[]")
                .to_string();
            unit.line(&format!(
                "__retVal = new {element}[{size}(&__retVal_native)];"
            ));
            unit.line(&format!("{}(&__retVal_native, __retVal);", ret.data));
        } else {
            unit.line(&format!("__retVal = {}(&__retVal_native);", ret.data));
        }
    }
    for staged in &ref_backs {
        let name = &staged.prop.name;
        if let (Some(data), Some(size)) = (&staged.data, &staged.size) {
            unit.line(&format!("Array.Resize(ref {name}, {size}(&__{name}));"));
            unit.line(&format!("{data}(&__{name}, {name});"));
        } else if let Some(data) = &staged.data {
            unit.line(&format!("{name} = {data}(&__{name});"));
        }
    }

    if guard {
        unit.dedent();
        unit.line("}");
        unit.line("finally {");
        unit.indent();
        unit.line("// Cleanup: destroy staging, even if conversion threw.");
        if let Some(ret) = &plan.ret_staging {
            unit.line(&format!("{}(&__retVal_native);", ret.destroy));
        }
        for staged in &plan.staged {
            unit.line(&format!("{}(&__{});", staged.destroy, staged.prop.name));
        }
        unit.dedent();
        unit.line("}");
    }

    // Close pinned scopes, innermost first.
    for _ in &plan.pinned {
        unit.dedent();
        unit.line("}");
    }

    if plan.has_return {
        if let Some(proto) = &method.ret_type.prototype {
            unit.line(&format!(
                "return Marshal.GetDelegateForFunctionPointer<{}>(__retVal);",
                proto.name
            ));
        } else {
            unit.line("return __retVal;");
        }
    }
    Ok(())
}

/// Argument expressions for the unmanaged call, aligned with the
/// unmanaged function pointer's parameter types.
fn call_args(plan: &CallPlan<'_>) -> String {
    let mut args = Vec::with_capacity(plan.method.param_types.len());
    for param in &plan.method.param_types {
        let kind = MarshalKind::of(param);
        let arg = match kind {
            MarshalKind::ObjectLike => format!("&__{}", param.name),
            MarshalKind::Pod if param.is_ref => format!("__{}", param.name),
            MarshalKind::Pod => format!("&{}", param.name),
            MarshalKind::Delegate if param.prototype.is_some() => {
                format!("Marshal.GetFunctionPointerForDelegate({})", param.name)
            }
            _ if param.is_ref => format!("__{}", param.name),
            _ => param.name.clone(),
        };
        args.push(arg);
    }
    args.join(", ")
}

fn emit_class(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    plan: &ClassPlan<'_>,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let class = plan.class;
    let summary = if class.description.is_empty() {
        if plan.handleless {
            format!("Static utility class for {}", class.name)
        } else {
            format!("{} wrapper", class.name)
        }
    } else {
        class.description.clone()
    };
    emit_xml_summary(unit, &summary);
    if !class.deprecated.is_empty() {
        unit.line(&format!("[Obsolete(\"{}\")]", class.deprecated));
    }

    if plan.handleless {
        unit.line(&format!("internal static unsafe class {}", class.name));
        unit.line("{");
        unit.indent();
        for binding in &plan.bindings {
            emit_binding(unit, manifest, plan, binding, mapper)?;
            unit.blank();
        }
        unit.dedent();
        unit.line("}");
        return Ok(());
    }

    let handle = &plan.handle_type;
    let invalid = &plan.invalid_value;
    let has_dtor = plan.has_destructor();

    if has_dtor {
        unit.line(&format!(
            "internal sealed unsafe class {} : SafeHandle",
            class.name
        ));
    } else {
        unit.line(&format!("internal sealed unsafe class {}", class.name));
    }
    unit.line("{");
    unit.indent();

    if !has_dtor {
        unit.line(&format!("private {handle} handle;"));
        unit.blank();
    }

    if !plan.has_zero_param_ctor {
        if has_dtor {
            unit.line(&format!(
                "public {}() : this({invalid}, Ownership.Borrowed) {{}}",
                class.name
            ));
        } else {
            unit.line(&format!("public {}() {{}}", class.name));
        }
        unit.blank();
    }

    for ctor in &plan.constructors {
        emit_constructor(unit, manifest, plan, ctor, mapper)?;
    }

    // Raw-handle constructor; the ownership default follows the
    // ambiguity rule computed by the plan.
    let default_arg = match plan.raw_ctor_default {
        Some(ownership) => format!(" = Ownership.{}", ownership.name()),
        None => String::new(),
    };
    emit_xml_summary(
        unit,
        &format!("Wraps an existing {} handle.", class.name),
    );
    if has_dtor {
        unit.line(&format!(
            "public {}({handle} handle, Ownership ownership{default_arg}) : base((nint)handle, ownsHandle: ownership == Ownership.Owned)",
            class.name
        ));
        unit.line("{");
        unit.line("}");
        unit.blank();

        let dtor = plan
            .destructor
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or_default();
        emit_xml_summary(unit, "Releases the handle; called at most once by SafeHandle.");
        unit.line("protected override bool ReleaseHandle()");
        unit.line("{");
        unit.line_deeper(&format!("{}.{dtor}(({handle})handle);", manifest.name));
        unit.line_deeper("return true;");
        unit.line("}");
        unit.blank();
        unit.line(&format!(
            "public override bool IsInvalid => handle == {invalid};"
        ));
        unit.blank();
        unit.line(&format!("public {handle} Handle => ({handle})handle;"));
        unit.line(&format!("public bool IsValid => handle != {invalid};"));
        unit.blank();
        emit_xml_summary(unit, "Reads the handle without transferring ownership.");
        unit.line(&format!("public {handle} Get() => ({handle})handle;"));
        unit.blank();
        emit_xml_summary(unit, "Releases ownership and returns the raw handle.");
        unit.line(&format!("public {handle} Release()"));
        unit.line("{");
        unit.line_deeper("var h = handle;");
        unit.line_deeper("SetHandleAsInvalid();");
        unit.line_deeper(&format!("return ({handle})h;"));
        unit.line("}");
        unit.blank();
        emit_xml_summary(unit, "Destroys the handle now if owned.");
        unit.line("public void Reset()");
        unit.line("{");
        unit.line_deeper("Dispose();");
        unit.line("}");
        unit.blank();
    } else {
        let ownership_param = if plan.has_constructors() {
            format!(", Ownership ownership{default_arg}")
        } else {
            String::new()
        };
        emit_xml_summary(
            unit,
            &format!("Wraps an existing {} handle.", class.name),
        );
        unit.line(&format!(
            "public {}({handle} handle{ownership_param})",
            class.name
        ));
        unit.line("{");
        unit.line_deeper("this.handle = handle;");
        unit.line("}");
        unit.blank();
        unit.line(&format!("public {handle} Handle => handle;"));
        unit.line(&format!("public bool IsValid => handle != {invalid};"));
        unit.blank();
        unit.line(&format!("public {handle} Get() => handle;"));
        unit.blank();
        unit.line(&format!("public {handle} Release()"));
        unit.line("{");
        unit.line_deeper("var h = handle;");
        unit.line_deeper(&format!("handle = {invalid};"));
        unit.line_deeper("return h;");
        unit.line("}");
        unit.blank();
        unit.line("public void Reset()");
        unit.line("{");
        unit.line_deeper(&format!("handle = {invalid};"));
        unit.line("}");
        unit.blank();
    }

    for binding in &plan.bindings {
        emit_binding(unit, manifest, plan, binding, mapper)?;
        unit.blank();
    }

    unit.dedent();
    unit.line("}");
    Ok(())
}

fn emit_constructor(
    unit: &mut UnitBuilder,
    manifest: &Manifest,
    plan: &ClassPlan<'_>,
    ctor: &Method,
    mapper: &TableMapper,
) -> Result<(), GenerateError> {
    let summary = if ctor.description.is_empty() {
        format!("Creates a new {} instance.", plan.class.name)
    } else {
        ctor.description.clone()
    };
    emit_xml_summary(unit, &summary);

    let mut params = Vec::new();
    let mut args = Vec::new();
    for param in &ctor.param_types {
        let ty = mapper.map_param_type(param, TypeCtx::Value)?;
        let mut part = format!("{ty} {}", param.name);
        if let Some(default) = param.default {
            part.push_str(&format!(" = {default}"));
        }
        params.push(part);
        args.push(param.name.clone());
    }
    let call = format!("{}.{}({})", manifest.name, ctor.name, args.join(", "));

    if plan.has_destructor() {
        unit.line(&format!(
            "public {}({}) : this({call}, Ownership.Owned)",
            plan.class.name,
            params.join(", ")
        ));
        unit.line("{");
        unit.line("}");
    } else {
        unit.line(&format!("public {}({})", plan.class.name, params.join(", ")));
        unit.line("{");
        unit.line_deeper(&format!("this.handle = {call};"));
        unit.line("}");
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

    let summary = if method.description.is_empty() {
        &binding.binding.name
    } else {
        &method.description
    };
    emit_xml_summary(unit, summary);
    for param in binding.params {
        let desc = if param.description.is_empty() {
            &param.name
        } else {
            &param.description
        };
        unit.line(&format!(
            "/// <param name=\"{}\">{desc}</param>",
            param.name
        ));
    }
    if !binding.binding.deprecated.is_empty() {
        unit.line(&format!("[Obsolete(\"{}\")]", binding.binding.deprecated));
    }

    let mut ret = mapper.map_return_type(&method.ret_type)?;
    if let Some(alias) = binding.ret_alias() {
        ret = alias.name.clone();
    }

    let mut params = Vec::new();
    for (i, param) in binding.params.iter().enumerate() {
        let ty = match binding.param_alias(i) {
            Some(alias) => alias.name.clone(),
            None => mapper.map_param_type(param, TypeCtx::Value)?,
        };
        let mut part = format!("{ty} {}", param.name);
        if let Some(default) = param.default {
            part.push_str(&format!(" = {default}"));
        }
        params.push(part);
    }

    let is_static = !binding.binding.bind_self;
    let prefix = if is_static { "static " } else { "" };
    unit.line(&format!(
        "public {prefix}{ret} {}({})",
        binding.binding.name,
        params.join(", ")
    ));
    unit.line("{");
    unit.indent();

    if binding.null_check {
        unit.line(&format!(
            "if (!IsValid) throw new EmptyHandleException(\"{}\");",
            plan.class.name
        ));
    }

    let handle_arg = if plan.has_destructor() { "Handle" } else { "handle" };
    let mut args = Vec::new();
    if binding.binding.bind_self {
        args.push(handle_arg.to_string());
    }
    for (i, param) in binding.params.iter().enumerate() {
        let arg = match binding.param_alias(i) {
            Some(alias) if alias.owner => format!("{}.Release()", param.name),
            Some(_) => format!("{}.Get()", param.name),
            None if param.is_ref => format!("ref {}", param.name),
            None => param.name.clone(),
        };
        args.push(arg);
    }
    let call = format!("{}.{}({})", manifest.name, method.name, args.join(", "));

    let emit_call = |unit: &mut UnitBuilder| {
        if method.ret_type.ty == "void" {
            unit.line(&format!("{call};"));
        } else if let Some(alias) = binding.ret_alias() {
            let ownership = if alias.owner {
                Ownership::Owned
            } else {
                Ownership::Borrowed
            };
            unit.line(&format!(
                "return new {}({call}, Ownership.{});",
                alias.name,
                ownership.name()
            ));
        } else {
            unit.line(&format!("return {call};"));
        }
    };

    if plan.has_destructor() && binding.binding.bind_self {
        // Keep the SafeHandle alive across the native call.
        unit.line("bool success = false;");
        unit.line("DangerousAddRef(ref success);");
        unit.line("try");
        unit.line("{");
        unit.indent();
        emit_call(unit);
        unit.dedent();
        unit.line("}");
        unit.line("finally");
        unit.line("{");
        unit.line_deeper("if (success) DangerousRelease();");
        unit.line("}");
    } else {
        emit_call(unit);
    }

    unit.dedent();
    unit.line("}");
    Ok(())
}
