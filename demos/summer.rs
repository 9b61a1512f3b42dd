use commandment::{Collection, Command, Nargs, Parameter};

fn main() {
    Command::new("summer")
        .add(
            Parameter::argument(Collection::<Vec<u32>, u32>::new(Nargs::AtLeastOne), "item")
                .help("The items to sum."),
        )
        .action(|result| {
            let sum: u32 = result
                .get::<Vec<u32>>("item")
                .map(|items| items.iter().sum())
                .unwrap_or_default();
            println!("Sum: {sum}");
            0
        })
        .build()
        .invoke();
}
