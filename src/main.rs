use rockfall::{
    open_utf8_file, Args, Catalog, JetPattern, Parser, Simulation,
};

const TARGET_UNITS_Q1: u64 = 2022_u64;
const TARGET_UNITS_Q2: u64 = 1_000_000_000_000_u64;

fn answer(jet_pattern: &JetPattern, target_units: u64, status_updates: bool) {
    match Simulation::new(Catalog::reference(), jet_pattern.clone()) {
        Ok(mut simulation) => {
            dbg!(simulation.run_with_status(target_units, status_updates));
        }
        Err(error) => {
            eprintln!("Failed to construct simulation:\n{error:#?}");
        }
    }
}

fn main() {
    let args: Args = Args::parse();
    let input_file_path: &str = args.input_file_path("input/jets.txt");

    if let Err(error) =
        // SAFETY: This operation is unsafe, we're just hoping nobody else touches the file while
        // this program is executing
        unsafe {
            open_utf8_file(input_file_path, |input: &str| {
                match JetPattern::try_from(input.trim_end()) {
                    Ok(jet_pattern) => {
                        if args.question != 2_u8 {
                            answer(&jet_pattern, TARGET_UNITS_Q1, args.verbose);
                        }

                        if args.question != 1_u8 {
                            answer(&jet_pattern, TARGET_UNITS_Q2, args.verbose);
                        }
                    }
                    Err(error) => {
                        eprintln!("Failed to parse jet pattern:\n{error:#?}");
                    }
                }
            })
        }
    {
        eprintln!("Failed to open UTF-8 file \"{input_file_path}\":\n{error}");
    }
}
