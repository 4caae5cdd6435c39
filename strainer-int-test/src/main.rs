use std::time::Instant;

use strainer::{Filter, FilterResult, ParseOptions, QueryNode};

fn main() -> FilterResult<()> {
    println!("Starting compile stress test...");

    let count: usize = 100_000;
    let clauses: Vec<String> = (0..count)
        .map(|i| format!("{{\"field_{}\": {{\"$gte\": {}}}}}", i, i))
        .collect();
    let text = format!("{{\"$or\": [{}]}}", clauses.join(", "));

    let options = ParseOptions::new().with_max_nodes(count + 1);
    let start = Instant::now();
    let filter = Filter::parse_str_with(&text, &options)?;
    let elapsed = start.elapsed();

    let children = match filter.root() {
        QueryNode::Combinator(combinator) => combinator.children().len(),
        QueryNode::Selector(_) => 1,
    };
    println!("Compiled {} clauses in {:?}", children, elapsed);

    Ok(())
}
