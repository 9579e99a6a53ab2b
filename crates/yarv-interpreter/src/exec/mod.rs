//! Opcode execution, split into one file per spec.md §4 category the way
//! the teacher splits instruction tables (gas costs, function pointers,
//! jump maps) across sibling files that each enumerate every opcode.
//!
//! [`Execute::exec`] is the single entry point `Vm::dispatch_loop` drives;
//! every other function in this module tree is a free function reached
//! only from the big match below.

pub mod arith;
pub mod calls;
pub mod collections;
pub mod control;
pub mod literals;
pub mod pattern;
pub mod stack;
pub mod strings;
pub mod vars;

use std::rc::Rc;

use yarv_bytecode::Insn;
use yarv_primitives::Value;

use crate::frame::Frame;
use crate::vm::Vm;
use crate::VmError;

/// What a dispatched instruction asks the driving loop to do next.
pub enum ControlFlow {
    /// Fall through to `pc + 1`; the loop already advanced it.
    Next,
    /// Override `pc` with an absolute instruction index.
    Jump(usize),
    /// Unwind this frame, yielding `Value` to its caller.
    Return(Value),
}

pub trait Execute {
    fn exec(&self, vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError>;
}

impl Execute for Insn {
    fn exec(&self, vm: &Vm, frame: &Rc<Frame>) -> Result<ControlFlow, VmError> {
        match self {
            // --- 4.2 stack manipulation ---
            Insn::Pop => stack::pop(vm, frame),
            Insn::Dup => stack::dup(vm, frame),
            Insn::DupN { n } => stack::dupn(vm, frame, *n),
            Insn::Swap => stack::swap(vm, frame),
            Insn::TopN { n } => stack::topn(vm, frame, *n),
            Insn::SetN { n } => stack::setn(vm, frame, *n),
            Insn::AdjustStack { n } => stack::adjuststack(vm, frame, *n),

            // --- 4.3 constants and literals ---
            Insn::PutNil => literals::putnil(vm, frame),
            Insn::PutSelf => literals::putself(vm, frame),
            Insn::PutObject { value } => literals::putobject(vm, frame, value),
            Insn::PutObjectInt2Fix0 => literals::putobject_int2fix(vm, frame, 0),
            Insn::PutObjectInt2Fix1 => literals::putobject_int2fix(vm, frame, 1),
            Insn::PutString { value } => literals::putstring(vm, frame, value),
            Insn::DupArray { value } => literals::dup_array(vm, frame, value),
            Insn::DupHash { value } => literals::dup_hash(vm, frame, value),
            Insn::PutSpecialObject { kind } => literals::put_special_object(vm, frame, *kind),

            // --- 4.4 arithmetic and comparison specializations ---
            Insn::OptArith { op, cd } => arith::opt_arith(vm, frame, *op, cd),
            Insn::OptNeq { eq_cd, .. } => arith::opt_neq(vm, frame, eq_cd),
            Insn::OptNewArrayMax { n } => arith::opt_newarray_max(vm, frame, *n),
            Insn::OptNewArrayMin { n } => arith::opt_newarray_min(vm, frame, *n),
            Insn::OptArefWith { key, cd } => arith::opt_aref_with(vm, frame, key, cd),
            Insn::OptAsetWith { key, cd } => arith::opt_aset_with(vm, frame, key, cd),
            Insn::OptStrFreeze { value, .. } => arith::opt_str_freeze(vm, frame, value),
            Insn::OptStrUminus { value, .. } => arith::opt_str_uminus(vm, frame, value),

            // --- 4.5 strings and ranges ---
            Insn::ConcatStrings { n } => strings::concat_strings(vm, frame, *n),
            Insn::AnyToString => strings::any_to_string(vm, frame),
            Insn::ObjToString { cd } => strings::obj_to_string(vm, frame, cd),
            Insn::Intern => strings::intern(vm, frame),
            Insn::ToRegexp { opts, n } => strings::to_regexp(vm, frame, *opts, *n),
            Insn::NewRange { exclusive } => strings::new_range(vm, frame, *exclusive),

            // --- 4.6 arrays and hashes ---
            Insn::NewArray { n } => collections::new_array(vm, frame, *n),
            Insn::NewArrayKwSplat { n } => collections::new_array_kw_splat(vm, frame, *n),
            Insn::NewHash { n } => collections::new_hash(vm, frame, *n),
            Insn::ConcatArray => collections::concat_array(vm, frame),
            Insn::SplatArray { flag } => collections::splat_array(vm, frame, *flag),
            Insn::ExpandArray { n, flags } => collections::expand_array(vm, frame, *n, *flags),

            // --- 4.7 variables ---
            Insn::GetLocal { idx, level } => vars::getlocal(vm, frame, *idx, *level),
            Insn::SetLocal { idx, level } => vars::setlocal(vm, frame, *idx, *level),
            Insn::GetLocalWc0 { idx } => vars::getlocal(vm, frame, *idx, 0),
            Insn::GetLocalWc1 { idx } => vars::getlocal(vm, frame, *idx, 1),
            Insn::SetLocalWc0 { idx } => vars::setlocal(vm, frame, *idx, 0),
            Insn::SetLocalWc1 { idx } => vars::setlocal(vm, frame, *idx, 1),
            Insn::GetBlockParam { idx, level } => vars::get_block_param(vm, frame, *idx, *level),
            Insn::GetBlockParamProxy { idx, level } => vars::get_block_param_proxy(vm, frame, *idx, *level),
            Insn::SetBlockParam { idx, level } => vars::set_block_param(vm, frame, *idx, *level),
            Insn::GetInstanceVariable { name, cache } => vars::get_instance_variable(vm, frame, name, cache),
            Insn::SetInstanceVariable { name, cache } => vars::set_instance_variable(vm, frame, name, cache),
            Insn::GetClassVariable { name, .. } | Insn::GetClassVariableLegacy { name } => vars::get_class_variable(vm, frame, name),
            Insn::SetClassVariable { name, .. } | Insn::SetClassVariableLegacy { name } => vars::set_class_variable(vm, frame, name),
            Insn::GetGlobal { name } => vars::get_global(vm, frame, name),
            Insn::SetGlobal { name } => vars::set_global(vm, frame, name),
            Insn::GetConstant { name } => vars::get_constant(vm, frame, name),
            Insn::SetConstant { name } => vars::set_constant(vm, frame, name),
            Insn::OptGetConstantPath { names } => vars::opt_get_constant_path(vm, frame, names),
            Insn::GetSpecial { key, kind } => vars::get_special(vm, frame, *key, *kind),
            Insn::SetSpecial { key } => vars::set_special(vm, frame, *key),

            // --- 4.8 control flow ---
            Insn::Jump { label } => control::jump(vm, frame, label),
            Insn::BranchIf { label } => control::branch_if(vm, frame, label),
            Insn::BranchUnless { label } => control::branch_unless(vm, frame, label),
            Insn::BranchNil { label } => control::branch_nil(vm, frame, label),
            Insn::OptCaseDispatch { table, else_label } => control::opt_case_dispatch(vm, frame, table, else_label),
            Insn::Leave => control::leave(vm, frame),
            Insn::Nop => control::nop(vm, frame),
            Insn::Throw { tag } => control::throw(vm, frame, *tag),

            // --- 4.9 pattern matching ---
            Insn::CheckMatch { kind } => pattern::check_match(vm, frame, *kind),
            Insn::CheckType { kind } => pattern::check_type(vm, frame, *kind),
            Insn::CheckKeyword { bits_idx, kw_idx } => pattern::check_keyword(vm, frame, *bits_idx, *kw_idx),
            Insn::Defined { kind, name, message } => pattern::defined(vm, frame, *kind, name, message),

            // --- 4.10 calls and definitions ---
            Insn::Send { cd, block_iseq } => calls::send(vm, frame, cd, block_iseq),
            Insn::OptSendWithoutBlock { cd } => calls::opt_send_without_block(vm, frame, cd),
            Insn::InvokeBlock { cd } => calls::invoke_block(vm, frame, cd),
            Insn::InvokeSuper { cd, block_iseq } => calls::invoke_super(vm, frame, cd, block_iseq),
            Insn::DefineClass { name, class_iseq, flags } => calls::define_class(vm, frame, name, class_iseq, *flags),
            Insn::DefineMethod { name, iseq } => calls::define_method(vm, frame, name, iseq),
            Insn::DefineSMethod { name, iseq } => calls::define_smethod(vm, frame, name, iseq),
            Insn::Once { iseq, cache } => calls::once(vm, frame, iseq, cache),
        }
    }
}
