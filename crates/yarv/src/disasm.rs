//! Textual disassembly (spec.md §6), rendering an iseq and every iseq it
//! embeds (method/block/class bodies) in encounter order.

use std::collections::VecDeque;
use std::rc::Rc;

use yarv_bytecode::{Disasm, Iseq, TextFormatter};

/// Renders `iseq` and every iseq it transitively embeds as one text
/// listing, one `"== disasm: ..."` header per iseq followed by its
/// instructions, the way the reference disassembler lays out nested
/// method/block/class bodies.
pub fn disassemble(iseq: &Rc<Iseq>) -> String {
    let mut out = String::new();
    let mut queue = VecDeque::new();
    queue.push_back(iseq.clone());

    while let Some(cur) = queue.pop_front() {
        out.push_str(&format!("== disasm: #<ISeq:{}@{}>\n", cur.name, cur.kind.as_str()));
        let mut formatter = TextFormatter::default();
        for insn in &cur.insns {
            out.push_str(&insn.disasm(&mut formatter));
            out.push('\n');
        }
        for child in formatter.pending {
            queue.push_back(child);
        }
        out.push('\n');
    }
    out
}
