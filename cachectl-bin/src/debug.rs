use cachectl::{BusRequest, CacheDebugger};

pub fn debug_mode(mut debugger: CacheDebugger) {
    println!("Debug mode.");
    println!("Enter 'h' for help.");

    // Signals driven on the bus for single steps.
    let mut bus = BusRequest::idle();
    loop {
        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => if input.starts_with("b:") {
                // Hold a read on the bus
                match u32::from_str_radix(input[2..].trim(), 16) {
                    Ok(addr) => {
                        println!("Driving read of ${:08X}", addr);
                        bus = BusRequest::read(addr);
                    },
                    Err(e) => println!("Invalid address: {}", e),
                }
            } else if input.starts_with("b") {
                // Release the bus
                println!("Bus idle");
                bus = BusRequest { active: false, ..bus };
            } else if input.starts_with("s:") {
                // Step x cycles
                match input[2..].trim().parse::<usize>() {
                    Ok(num) => {
                        for _ in 0..num {
                            step(&mut debugger, &bus);
                        }
                    },
                    Err(e) => println!("Invalid number of steps: {}", e),
                }
            } else if input.starts_with("s") {
                step(&mut debugger, &bus);
            } else if let Some(addr) = input.strip_prefix("r:") {
                // Whole read transaction
                match u32::from_str_radix(addr.trim(), 16) {
                    Ok(addr) => match debugger.read(addr) {
                        Ok(done) => println!("${:08X}: ${:04X} ({} cycles)", addr, done.data, done.cycles),
                        Err(e) => println!("Read failed: {}", e),
                    },
                    Err(e) => println!("Invalid address: {}", e),
                }
            } else if let Some(args) = input.strip_prefix("w:") {
                // Whole write transaction
                write(args.trim(), &mut debugger);
            } else if input.starts_with("x") {
                match debugger.reset() {
                    Ok(done) => println!("Reset done ({} cycles)", done.cycles),
                    Err(e) => println!("Reset failed: {}", e),
                }
            } else if input.starts_with("p:") {
                print(input[2..].trim(), &debugger);
            } else if input.starts_with("p") {
                print_state(&debugger);
            } else if input.starts_with("h") {
                help();
            } else if input.starts_with("q") {
                break;
            },
            Err(e) => println!("Input error: {}", e),
        }
    }

    debugger.stats().print();
}

fn step(debugger: &mut CacheDebugger, bus: &BusRequest) {
    let resp = debugger.step(bus);
    let snapshot = debugger.snapshot();
    if resp.ack {
        println!("{:>6}: {:?} ack ${:04X}", snapshot.cycle, resp.state, resp.data);
    } else {
        println!("{:>6}: {:?}", snapshot.cycle, resp.state);
    }
}

fn write(args: &str, debugger: &mut CacheDebugger) {
    let Some((addr, data)) = args.split_once(':') else {
        println!("Expected w:ADDR:DATA");
        return;
    };
    match (u32::from_str_radix(addr, 16), u16::from_str_radix(data, 16)) {
        (Ok(addr), Ok(data)) => match debugger.write(addr, data) {
            Ok(done) => println!("${:08X} <- ${:04X} ({} cycles)", addr, data, done.cycles),
            Err(e) => println!("Write failed: {}", e),
        },
        (Err(e), _) | (_, Err(e)) => println!("Invalid write: {}", e),
    }
}

fn print(s: &str, debugger: &CacheDebugger) {
    if let Some(set) = s.strip_prefix("s") {
        match set.parse::<usize>() {
            Ok(set) => match debugger.set_contents(set) {
                Some(contents) => {
                    println!("set {} lru: {:03b}", set, contents.lru.bits());
                    for (block, line) in contents.lines.iter().enumerate() {
                        let data = line.data.iter()
                            .map(|w| format!("{:04X}", w))
                            .collect::<Vec<_>>()
                            .join(" ");
                        println!("  {}: {} tag ${:07X} | {}", block, if line.valid {"V"} else {"-"}, line.tag, data);
                    }
                },
                None => println!("No such set: {}", set),
            },
            Err(e) => println!("Invalid p tag: {}", e),
        }
    } else if let Some(addr) = s.strip_prefix("m") {
        match u32::from_str_radix(addr, 16) {
            Ok(addr) => match debugger.read_dram(addr) {
                Ok(data) => println!("${:08X}: ${:04X}", addr, data),
                Err(e) => println!("{}", e),
            },
            Err(e) => println!("Invalid p tag: {}", e),
        }
    } else {
        println!("unrecognised printable")
    }
}

fn print_state(debugger: &CacheDebugger) {
    let snapshot = debugger.snapshot();
    let regs = snapshot.registers;
    let out = snapshot.outputs;
    println!("cycle: {} state: {:?} ({})", snapshot.cycle, regs.state, regs.state.code());
    println!("counter: {} victim: {} lru hold: {:03b}", regs.counter, regs.victim, regs.lru_hold.bits());
    println!("ack: {} read data: ${:04X}", out.ack, out.read_data);
    println!(
        "set: {} word: {} tag_we: {:?} data_we: {:?} valid_we: {:?} lru_we: {}",
        out.arrays.set_index, out.arrays.word_offset, out.arrays.tag_we, out.arrays.data_we, out.arrays.valid_we, out.arrays.lru_we
    );
    println!(
        "dram: ${:08X} rd: {} wr: {}",
        out.dram.address, out.dram.read_strobe, out.dram.write_strobe
    );
}

fn help() {
    println!("b:x: Drive a read of address x (hex) on the bus for following steps.");
    println!("b: Drop the request line.");
    println!("s: Step a single cycle.");
    println!("s:x: Step multiple cycles (base 10).");
    println!("r:x: Read address x (hex) through the cache.");
    println!("w:x:y: Write y (hex) to address x (hex).");
    println!("x: Reset the cache.");
    println!("p: Print the controller registers and last outputs.");
    println!("p:sx: Print the contents of set x.");
    println!("p:mx: Print the backing store word at address x (hex).");
    println!("q: Quit.");
}
