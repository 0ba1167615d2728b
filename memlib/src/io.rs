use std::fs::File;
use std::io::BufRead;

pub fn get_reader(file: File) -> std::io::Result<impl BufRead> {
    // Buffered fallback for non-unix systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        const BUFFER_SIZE: usize = 1 << 16;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Unix gets a memory map; trace files can run to hundreds of megabytes
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        use std::io::Cursor;
        unsafe {
            let m = Mmap::map(&file)?;
            m.advise(Advice::Sequential)?;
            Ok(Cursor::new(m))
        }
    }
}
