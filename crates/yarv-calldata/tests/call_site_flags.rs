//! Cross-module scenarios over `CallData`/`CallDataFlags` as a call-like
//! opcode (`send`/`invokesuper`) would read them, rather than unit-level
//! bit twiddling.

use yarv_calldata::{CallData, CallDataFlags};
use yarv_primitives::Symbol;

#[test]
fn a_plain_send_site_has_no_block_and_is_not_super() {
    let cd = CallData::new("foo", 1, CallDataFlags::ARGS_SIMPLE | CallDataFlags::FCALL);
    assert!(!cd.has_block_arg());
    assert!(!cd.is_super());
    assert_eq!(cd.kw_count(), 0);
}

#[test]
fn a_block_iseq_site_reports_has_block_arg() {
    let cd = CallData::new("each", 0, CallDataFlags::BLOCKISEQ);
    assert!(cd.has_block_arg());
}

#[test]
fn zsuper_and_super_both_satisfy_is_super() {
    let zsuper = CallData::new("initialize", 0, CallDataFlags::ZSUPER);
    let sup = CallData::new("initialize", 2, CallDataFlags::SUPER);
    assert!(zsuper.is_super());
    assert!(sup.is_super());
}

#[test]
fn keyword_args_carry_their_names_and_count() {
    let cd = CallData::new("configure", 0, CallDataFlags::FCALL)
        .with_kw_arg(vec![Symbol::intern("timeout"), Symbol::intern("retries")]);
    assert!(cd.flags.contains(CallDataFlags::KWARG));
    assert_eq!(cd.kw_count(), 2);
    assert_eq!(cd.kw_arg, Some(vec![Symbol::intern("timeout"), Symbol::intern("retries")]));
}
