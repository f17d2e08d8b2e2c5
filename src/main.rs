use c_cpp_runner::Error;

fn main() {
    if let Err(e) = c_cpp_runner::run() {
        log::error!("Application error: {}", e);
        match e {
            Error::Io(io_err) => eprintln!("Error: A file system I/O error occurred: {}", io_err),
            Error::Config(msg) => eprintln!("Error: Configuration issue: {}", msg),
            Error::Settings(msg) => eprintln!("Error: Could not read the compiler settings: {}", msg),
            Error::Discovery(msg) => eprintln!("Error: Source discovery failed: {}", msg),
            Error::Execution(msg) => eprintln!("Error: Task execution failed: {}", msg),
            Error::FileSystem(msg) => eprintln!("Error: File system operation failed: {}", msg),
        }
        std::process::exit(1);
    }
}
