use desensitizer_mask::GeneratorRegistry;

fn main() {
    let registry = GeneratorRegistry::new();
    for type_tag in registry.type_tags() {
        println!("{type_tag}");
    }
}
