mod scan;
mod tls;
