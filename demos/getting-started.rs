use nanocore::{Event, Runtime};

/// Encodes a single NanoCore instruction word from its fields, per the fixed 32-bit layout:
/// opcode `[31:26]`, rd `[25:21]`, rs1 `[20:16]`, rs2 `[15:11]`, imm16 `[15:0]`.
fn encode(opcode: u8, rd: u8, rs1: u8, rs2_or_imm: u16) -> u32 {
    ((opcode as u32) << 26) | ((rd as u32) << 21) | ((rs1 as u32) << 16) | (rs2_or_imm as u32 & 0xFFFF)
}

fn main() -> Result<(), nanocore::Error> {
    env_logger::init();

    let runtime = Runtime::new();
    let handle = runtime.create_vm(1 << 20)?;

    // LD R1, 5
    // LD R2, 10
    // ADD R3, R1, R2
    // HALT
    let words = [
        encode(0x0F, 1, 0, 5),
        encode(0x0F, 2, 0, 10),
        encode(0x00, 3, 1, 2 << 11),
        encode(0x21, 0, 0, 0),
    ];

    let program: Vec<u8> = words.iter().flat_map(|word| word.to_le_bytes()).collect();
    runtime.load_program(handle, &program, 0x10000)?;

    match runtime.run(handle, 0)? {
        Some(Event::Halted) => println!("program halted normally"),
        other => println!("unexpected event: {other:?}"),
    }

    let r3 = runtime.get_register(handle, 3)?;
    let retired = runtime.get_perf_counter(handle, 0)?;
    println!("R3 = {r3} (expected 15), instructions retired = {retired}");

    runtime.destroy_vm(handle)?;

    Ok(())
}
