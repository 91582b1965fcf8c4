fn main() {
    println!("somatic-qc-rs - Alignment QC for tumor/normal somatic workflows");
    println!();
    println!("Tools:");
    println!("  get_genome  - Detect the genome build (hg19, hg38, chm13v2) from chromosome sizes");
    println!("  report_qc   - Render the tumor/normal alignment QC report (HTML)");
    println!();
    println!("For help with each tool:");
    println!("  cargo run --bin get_genome -- --help");
    println!("  cargo run --bin report_qc -- --help");
    println!();
    println!("Quick start examples:");
    println!("  cargo run --bin get_genome -- --chr_counts sample.fai -o genome.txt -w str");
    println!("  cargo run --bin get_genome -- --bam tumor.bam -o genome.txt");
    println!("  cargo run --bin report_qc -- --name run1 --sample_id S1 \\");
    println!("      --tumor_cov_threshold 30 --normal_cov_threshold 20 \\");
    println!("      --read_stats_tumor tumor.readstats.tsv.gz --mosdepth_summary_tumor tumor.summary.txt");
}
